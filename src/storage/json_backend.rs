use chrono::{DateTime, NaiveDateTime, Utc};
use std::{
    cmp::Reverse,
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};
use uuid::Uuid;

use crate::{
    domain::{Book, Identifiable, LinkTarget},
    errors::BookError,
    utils::{
        self, canonical_name,
        persistence::{load_book_from_file, save_book_to_file},
    },
};

use super::{BookStorage, Result};

const BOOK_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
const DEFAULT_RETENTION: usize = 5;

/// Parsed view of a backup file name.
#[derive(Debug, Clone, PartialEq)]
pub struct BookBackupInfo {
    pub file_name: String,
    pub created_at: DateTime<Utc>,
    pub note: Option<String>,
}

/// Stores each book as a pretty-printed JSON file, keeping rolling backups
/// under `<backups>/<book-slug>/`.
#[derive(Debug, Clone)]
pub struct JsonBookStorage {
    books_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonBookStorage {
    pub fn new(books_dir: PathBuf, backups_dir: PathBuf) -> Result<Self> {
        Self::with_retention(books_dir, backups_dir, DEFAULT_RETENTION)
    }

    pub fn with_retention(
        books_dir: PathBuf,
        backups_dir: PathBuf,
        retention: usize,
    ) -> Result<Self> {
        fs::create_dir_all(&books_dir)?;
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            books_dir,
            backups_dir,
            retention: retention.max(1),
        })
    }

    pub fn book_path(&self, name: &str) -> PathBuf {
        self.books_dir
            .join(format!("{}.{}", canonical_name(name), BOOK_EXTENSION))
    }

    pub fn backup_path(&self, name: &str, backup_name: &str) -> PathBuf {
        self.backup_dir(name).join(backup_name)
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Backups for `name`, newest first, with their parsed timestamps.
    pub fn backup_details(&self, name: &str) -> Result<Vec<BookBackupInfo>> {
        let mut details: Vec<(BookBackupInfo, u32)> = self
            .backup_file_names(name)?
            .into_iter()
            .filter_map(|file_name| parse_backup_name(&file_name))
            .collect();
        details.sort_by_key(|(info, counter)| Reverse((info.created_at, *counter)));
        Ok(details.into_iter().map(|(info, _)| info).collect())
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    fn backup_file_names(&self, name: &str) -> Result<Vec<String>> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BOOK_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                names.push(file_name.to_string());
            }
        }
        Ok(names)
    }

    /// Picks a free backup file name, adding a counter when two backups land
    /// in the same millisecond.
    fn next_backup_path(&self, name: &str, note: Option<&str>) -> Result<PathBuf> {
        let existing = self.backup_file_names(name)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let base = format!("{}_{}", canonical_name(name), timestamp);
        let taken = |prefix: &str| {
            existing.iter().any(|file| {
                file.strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('.') || rest.starts_with('_'))
            })
        };

        let mut stem = base.clone();
        let mut counter = 0;
        while taken(&stem) {
            counter += 1;
            stem = format!("{base}-{counter}");
        }
        if let Some(label) = utils::sanitize_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        Ok(self
            .backup_dir(name)
            .join(format!("{}.{}", stem, BOOK_EXTENSION)))
    }

    fn backup_existing_file(&self, name: &str, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        fs::create_dir_all(self.backup_dir(name))?;
        let backup_path = self.next_backup_path(name, None)?;
        fs::copy(path, &backup_path)?;
        self.prune_backups(name)
    }

    fn prune_backups(&self, name: &str) -> Result<()> {
        let backups = self.list_backups(name)?;
        for stale in backups.iter().skip(self.retention) {
            let path = self.backup_path(name, stale);
            if let Err(err) = fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl BookStorage for JsonBookStorage {
    fn save_book(&self, book: &Book, name: &str) -> Result<()> {
        let path = self.book_path(name);
        self.backup_existing_file(name, &path)?;
        save_book_to_file(book, &path)?;
        tracing::debug!(book = %name, path = %path.display(), "book saved");
        Ok(())
    }

    fn load_book(&self, name: &str) -> Result<Book> {
        let path = self.book_path(name);
        if !path.exists() {
            return Err(BookError::StorageError(format!("book `{}` not found", name)));
        }
        let book = load_book_from_file(&path)?;
        for warning in book_warnings(&book) {
            tracing::warn!(book = %name, "{warning}");
        }
        Ok(book)
    }

    fn list_books(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.books_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BOOK_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete_book(&self, name: &str) -> Result<()> {
        let path = self.book_path(name);
        if !path.exists() {
            return Err(BookError::StorageError(format!("book `{}` not found", name)));
        }
        fs::remove_file(&path)?;
        tracing::info!(book = %name, "book deleted");
        Ok(())
    }

    fn backup_book(&self, book: &Book, name: &str, note: Option<&str>) -> Result<String> {
        fs::create_dir_all(self.backup_dir(name))?;
        let path = self.next_backup_path(name, note)?;
        save_book_to_file(book, &path)?;
        self.prune_backups(name)?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| BookError::StorageError("backup path has no file name".into()))?;
        tracing::info!(book = %name, backup = %file_name, "backup created");
        Ok(file_name)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<String>> {
        Ok(self
            .backup_details(name)?
            .into_iter()
            .map(|info| info.file_name)
            .collect())
    }

    fn restore_backup(&self, name: &str, backup_name: &str) -> Result<Book> {
        let backup_path = self.backup_path(name, backup_name);
        if !backup_path.exists() {
            return Err(BookError::StorageError(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        let book = load_book_from_file(&backup_path)?;
        save_book_to_file(&book, &self.book_path(name))?;
        tracing::info!(book = %name, backup = %backup_name, "backup restored");
        Ok(book)
    }
}

fn id_set<'a, T, I>(items: I) -> HashSet<Uuid>
where
    T: Identifiable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items.into_iter().map(Identifiable::id).collect()
}

/// Reports links and back-references that point at records no longer in the book.
pub fn book_warnings(book: &Book) -> Vec<String> {
    let transaction_ids = id_set(&book.transactions);
    let expense_ids = id_set(&book.expenses);
    let invoice_ids = id_set(book.documents.iter().filter(|doc| doc.is_invoice()));
    let linked: HashSet<_> = book.links.iter().map(|link| link.transaction_id).collect();
    let mut warnings = Vec::new();

    for link in &book.links {
        if !transaction_ids.contains(&link.transaction_id) {
            warnings.push(format!(
                "link {} references unknown transaction {}",
                link.id, link.transaction_id
            ));
        }
        match link.target {
            LinkTarget::Expense(id) if !expense_ids.contains(&id) => warnings.push(format!(
                "link {} references missing expense {}",
                link.id, id
            )),
            LinkTarget::Invoice(id) if !invoice_ids.contains(&id) => warnings.push(format!(
                "link {} references missing invoice {}",
                link.id, id
            )),
            _ => {}
        }
    }
    for txn in &book.transactions {
        if txn.is_reconciled && !linked.contains(&txn.id) {
            warnings.push(format!("transaction {} is reconciled without links", txn.id));
        }
    }
    for expense in &book.expenses {
        if let Some(txn) = expense.reconciled_transaction_id {
            if !transaction_ids.contains(&txn) {
                warnings.push(format!(
                    "expense {} references unknown transaction {}",
                    expense.id, txn
                ));
            }
        }
    }
    warnings
}

/// `<slug>_<date>_<time>[-counter][_note].json`
fn parse_backup_name(file_name: &str) -> Option<(BookBackupInfo, u32)> {
    let stem = file_name.strip_suffix(&format!(".{}", BOOK_EXTENSION))?;
    let mut segments = stem.splitn(4, '_');
    let _slug = segments.next()?;
    let date_part = segments.next()?;
    let time_segment = segments.next()?;
    let note = segments.next().map(str::to_string);

    let (time_part, counter) = match time_segment.split_once('-') {
        Some((time, counter)) => (time, counter.parse().ok()?),
        None => (time_segment, 0),
    };
    if !is_digits(date_part, 8) || !is_digits(time_part, 9) {
        return None;
    }
    let raw = format!("{}{}", date_part, &time_part[..6]);
    let millis: i64 = time_part[6..].parse().ok()?;
    let naive = NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M%S").ok()?;
    let created_at = DateTime::from_naive_utc_and_offset(naive, Utc)
        + chrono::Duration::milliseconds(millis);
    Some((
        BookBackupInfo {
            file_name: file_name.to_string(),
            created_at,
            note,
        },
        counter,
    ))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BankTransaction, Expense, ReconciliationLink};
    use chrono::NaiveDate;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn storage_with_temp_dir(retention: usize) -> (JsonBookStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage = JsonBookStorage::with_retention(
            temp.path().join("books"),
            temp.path().join("backups"),
            retention,
        )
        .expect("json storage");
        (storage, temp)
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (storage, _guard) = storage_with_temp_dir(3);
        let book = Book::new("Sample");
        storage.save_book(&book, "Smith Joinery").expect("save book");
        let loaded = storage.load_book("smith joinery").expect("load book");
        assert_eq!(loaded.name, "Sample");
        assert_eq!(storage.list_books().unwrap(), vec!["smith-joinery".to_string()]);
    }

    #[test]
    fn missing_book_is_a_storage_error() {
        let (storage, _guard) = storage_with_temp_dir(3);
        let err = storage.load_book("nope").unwrap_err();
        assert!(matches!(err, BookError::StorageError(_)));
        assert!(storage.delete_book("nope").is_err());
    }

    #[test]
    fn resave_backs_up_previous_file_and_prunes() {
        let (storage, _guard) = storage_with_temp_dir(2);
        let book = Book::new("Rolling");
        for _ in 0..5 {
            storage.save_book(&book, "rolling").unwrap();
        }
        let backups = storage.list_backups("rolling").unwrap();
        assert_eq!(backups.len(), 2);
    }

    #[test]
    fn backup_names_carry_note_and_restore() {
        let (storage, _guard) = storage_with_temp_dir(3);
        let mut book = Book::new("Notes");
        storage.save_book(&book, "notes").unwrap();
        let name = storage
            .backup_book(&book, "notes", Some("Year End"))
            .expect("create backup");
        assert!(name.starts_with("notes_"));
        assert!(name.ends_with("_year-end.json"), "{name}");

        book.name = "Changed".into();
        storage.save_book(&book, "notes").unwrap();
        let restored = storage.restore_backup("notes", &name).unwrap();
        assert_eq!(restored.name, "Notes");
        assert_eq!(storage.load_book("notes").unwrap().name, "Notes");

        let details = storage.backup_details("notes").unwrap();
        assert!(details
            .iter()
            .any(|info| info.note.as_deref() == Some("year-end")));
    }

    #[test]
    fn parse_backup_name_reads_counter_and_note() {
        let (info, counter) =
            parse_backup_name("acme_20240102_030405678-2_month-end.json").unwrap();
        assert_eq!(counter, 2);
        assert_eq!(info.note.as_deref(), Some("month-end"));
        assert_eq!(
            info.created_at.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            "2024-01-02 03:04:05.678"
        );
        assert!(parse_backup_name("acme_2024_0304.json").is_none());
    }

    #[test]
    fn warnings_flag_dangling_references() {
        let mut book = Book::new("Dangling");
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let txn = book.add_transaction(BankTransaction::new(-5.0, date, "card"));
        book.links.push(ReconciliationLink::new(
            txn,
            LinkTarget::Expense(Uuid::new_v4()),
            5.0,
        ));
        let mut orphan = BankTransaction::new(-1.0, date, "orphan");
        orphan.is_reconciled = true;
        book.add_transaction(orphan);
        let mut expense = Expense::new(3.0, date, "Shop", "Misc");
        expense.mark_reconciled(Uuid::new_v4());
        book.add_expense(expense);

        let warnings = book_warnings(&book);
        assert_eq!(warnings.len(), 3, "{warnings:?}");
    }
}

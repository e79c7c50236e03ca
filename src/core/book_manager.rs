use uuid::Uuid;

use crate::config::MatchingSettings;
use crate::core::services::{ReconciliationService, ServiceResult};
use crate::domain::{Book, ReconciliationLink, SuggestedMatch};
use crate::errors::{BookError, Result};
use crate::storage::BookStorage;

/// Facade that coordinates the open book, persistence, and backups.
///
/// Reconciliation actions go through the services on the in-memory book and
/// are saved straight away. When the save fails the previous book is put
/// back, so memory and disk never disagree about links and flags.
pub struct BookManager {
    pub current: Option<Book>,
    current_name: Option<String>,
    storage: Box<dyn BookStorage>,
}

impl BookManager {
    pub fn new(storage: Box<dyn BookStorage>) -> Self {
        Self {
            current: None,
            current_name: None,
            storage,
        }
    }

    pub fn storage(&self) -> &dyn BookStorage {
        self.storage.as_ref()
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current_name.as_deref()
    }

    /// Starts a new empty book and saves it under `name`.
    pub fn create(&mut self, name: &str) -> Result<()> {
        let book = Book::new(name);
        self.storage.save_book(&book, name)?;
        self.set_current(book, name);
        tracing::info!(book = %name, "book created");
        Ok(())
    }

    pub fn load(&mut self, name: &str) -> Result<&Book> {
        let book = self.storage.load_book(name)?;
        self.set_current(book, name);
        self.book()
    }

    pub fn save(&self) -> Result<()> {
        let (book, name) = self.loaded()?;
        self.storage.save_book(book, name)
    }

    pub fn backup(&self, note: Option<&str>) -> Result<String> {
        let (book, name) = self.loaded()?;
        self.storage.backup_book(book, name, note)
    }

    pub fn list_backups(&self) -> Result<Vec<String>> {
        let (_, name) = self.loaded()?;
        self.storage.list_backups(name)
    }

    pub fn restore_backup(&mut self, backup_name: &str) -> Result<()> {
        let name = self
            .current_name
            .clone()
            .ok_or(BookError::BookNotLoaded)?;
        let book = self.storage.restore_backup(&name, backup_name)?;
        self.current = Some(book);
        Ok(())
    }

    pub fn set_current(&mut self, book: Book, name: &str) {
        self.current = Some(book);
        self.current_name = Some(name.to_string());
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.current_name = None;
    }

    pub fn book(&self) -> Result<&Book> {
        self.current.as_ref().ok_or(BookError::BookNotLoaded)
    }

    pub fn suggestions(&self, settings: &MatchingSettings) -> Result<Vec<SuggestedMatch>> {
        Ok(ReconciliationService::suggestions(self.book()?, settings))
    }

    pub fn accept(&mut self, suggestion: &SuggestedMatch) -> Result<ReconciliationLink> {
        self.apply_and_persist(|book| ReconciliationService::accept(book, suggestion))
    }

    pub fn reconcile_multi(
        &mut self,
        transaction_id: Uuid,
        expense_ids: &[Uuid],
        invoice_ids: &[Uuid],
    ) -> Result<Vec<ReconciliationLink>> {
        self.apply_and_persist(|book| {
            ReconciliationService::reconcile_multi(book, transaction_id, expense_ids, invoice_ids)
        })
    }

    pub fn unreconcile(&mut self, transaction_id: Uuid) -> Result<usize> {
        self.apply_and_persist(|book| ReconciliationService::unreconcile(book, transaction_id))
    }

    /// Runs an arbitrary service call on the open book and saves the result.
    pub fn apply_and_persist<T, F>(&mut self, action: F) -> Result<T>
    where
        F: FnOnce(&mut Book) -> ServiceResult<T>,
    {
        let name = self
            .current_name
            .clone()
            .ok_or(BookError::BookNotLoaded)?;
        let book = self.current.as_mut().ok_or(BookError::BookNotLoaded)?;
        let previous = book.clone();
        let outcome = action(book)?;
        if let Err(err) = self.storage.save_book(book, &name) {
            tracing::warn!(book = %name, %err, "save failed, rolling back in-memory change");
            *book = previous;
            return Err(err);
        }
        Ok(outcome)
    }

    fn loaded(&self) -> Result<(&Book, &str)> {
        let book = self.current.as_ref().ok_or(BookError::BookNotLoaded)?;
        let name = self
            .current_name
            .as_deref()
            .ok_or(BookError::BookNotLoaded)?;
        Ok((book, name))
    }
}

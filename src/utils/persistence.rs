use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};

use crate::{domain::Book, errors::BookError};

const TMP_SUFFIX: &str = "tmp";

/// Serializes `value` as pretty JSON, staging to a temporary file before
/// renaming it over `path`.
pub fn write_json_atomic<T: Serialize>(value: &T, path: &Path) -> Result<(), BookError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    let json = serde_json::to_string_pretty(value)?;
    write_file(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, BookError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Writes the provided book to disk atomically by staging to a temporary file.
pub fn save_book_to_file(book: &Book, path: &Path) -> Result<(), BookError> {
    write_json_atomic(book, path)
}

/// Loads a book snapshot from disk, returning structured errors on failure.
pub fn load_book_from_file(path: &Path) -> Result<Book, BookError> {
    read_json(path)
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

pub(crate) fn write_file(path: &Path, data: &str) -> Result<(), BookError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

pub mod json_backend;

use crate::{domain::Book, errors::BookError};

pub type Result<T> = std::result::Result<T, BookError>;

/// Abstraction over persistence backends capable of storing books and snapshots.
pub trait BookStorage: Send + Sync {
    fn save_book(&self, book: &Book, name: &str) -> Result<()>;
    fn load_book(&self, name: &str) -> Result<Book>;
    fn list_books(&self) -> Result<Vec<String>>;
    fn delete_book(&self, name: &str) -> Result<()>;
    fn backup_book(&self, book: &Book, name: &str, note: Option<&str>) -> Result<String>;
    fn list_backups(&self, name: &str) -> Result<Vec<String>>;
    fn restore_backup(&self, name: &str, backup_name: &str) -> Result<Book>;
}

pub use json_backend::{book_warnings, BookBackupInfo, JsonBookStorage};

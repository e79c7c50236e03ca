use std::result::Result as StdResult;

use thiserror::Error;
use uuid::Uuid;

use crate::config::ConfigError;
use crate::core::services::ServiceError;

/// Unified error type for domain, service and storage layers.
#[derive(Error, Debug)]
pub enum BookError {
    #[error("Book not loaded")]
    BookNotLoaded,
    #[error("Bank transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("Expense not found: {0}")]
    ExpenseNotFound(Uuid),
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(Uuid),
    #[error("Quote not found: {0}")]
    QuoteNotFound(Uuid),
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl BookError {
    /// True for the family of errors raised when an id does not resolve.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BookError::TransactionNotFound(_)
                | BookError::ExpenseNotFound(_)
                | BookError::InvoiceNotFound(_)
                | BookError::QuoteNotFound(_)
        )
    }
}

pub type Result<T> = StdResult<T, BookError>;

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] BookError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<std::io::Error> for BookError {
    fn from(err: std::io::Error) -> Self {
        BookError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for BookError {
    fn from(err: serde_json::Error) -> Self {
        BookError::StorageError(err.to_string())
    }
}

impl From<ConfigError> for BookError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(io) => BookError::StorageError(io.to_string()),
            other => BookError::ConfigError(other.to_string()),
        }
    }
}

impl From<ServiceError> for CliError {
    fn from(err: ServiceError) -> Self {
        CliError::Core(BookError::from(err))
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::from(BookError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_family_is_detected() {
        assert!(BookError::TransactionNotFound(Uuid::nil()).is_not_found());
        assert!(BookError::InvoiceNotFound(Uuid::nil()).is_not_found());
        assert!(!BookError::BookNotLoaded.is_not_found());
    }

    #[test]
    fn io_errors_map_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = BookError::from(io);
        assert!(matches!(err, BookError::StorageError(ref msg) if msg.contains("disk full")));
    }
}

pub mod banking_service;
pub mod quote_service;
pub mod reconciliation_service;

pub use banking_service::BankingService;
pub use quote_service::QuoteService;
pub use reconciliation_service::{AllocationSummary, ReconciliationService};

use crate::domain::Book;
use crate::errors::BookError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] BookError),
    #[error("{0}")]
    Invalid(String),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Core(err) if err.is_not_found())
    }
}

impl From<ServiceError> for BookError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Core(inner) => inner,
            ServiceError::Invalid(message) => BookError::InvalidInput(message),
        }
    }
}

/// Runs `action` against a staged copy of the book and commits it only when
/// the whole action succeeds, so callers never observe a half-applied change.
pub(crate) fn apply_staged<T, F>(book: &mut Book, action: F) -> ServiceResult<T>
where
    F: FnOnce(&mut Book) -> ServiceResult<T>,
{
    let mut staged = book.clone();
    let outcome = action(&mut staged)?;
    staged.touch();
    *book = staged;
    Ok(outcome)
}

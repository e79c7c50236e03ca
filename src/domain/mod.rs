pub mod banking;
pub mod book;
pub mod common;
pub mod quote;

pub use banking::{
    BankTransaction, Expense, LinkTarget, MatchConfidence, ReconciliationLink, SuggestedMatch,
};
pub use book::Book;
pub use common::{first_present, Amounted, Displayable, Identifiable};
pub use quote::{
    AdjustmentKind, DisplayOptions, DocumentStatus, DocumentType, LabourItem, LineItem,
    PartPayment, QuoteDocument, Section,
};

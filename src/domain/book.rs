use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    banking::{BankTransaction, Expense, LinkTarget, ReconciliationLink},
    quote::QuoteDocument,
};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// A business's books: documents, expenses, bank lines and the settlement
/// links between them. This is the unit that storage loads and saves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub documents: Vec<QuoteDocument>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub transactions: Vec<BankTransaction>,
    #[serde(default)]
    pub links: Vec<ReconciliationLink>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Book::schema_version_default")]
    pub schema_version: u8,
}

impl Book {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            documents: Vec::new(),
            expenses: Vec::new(),
            transactions: Vec::new(),
            links: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_document(&mut self, document: QuoteDocument) -> Uuid {
        let id = document.id;
        self.documents.push(document);
        self.touch();
        id
    }

    pub fn add_expense(&mut self, expense: Expense) -> Uuid {
        let id = expense.id;
        self.expenses.push(expense);
        self.touch();
        id
    }

    pub fn add_transaction(&mut self, transaction: BankTransaction) -> Uuid {
        let id = transaction.id;
        self.transactions.push(transaction);
        self.touch();
        id
    }

    pub fn document(&self, id: Uuid) -> Option<&QuoteDocument> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    pub fn document_mut(&mut self, id: Uuid) -> Option<&mut QuoteDocument> {
        self.documents.iter_mut().find(|doc| doc.id == id)
    }

    pub fn invoice(&self, id: Uuid) -> Option<&QuoteDocument> {
        self.document(id).filter(|doc| doc.is_invoice())
    }

    pub fn expense(&self, id: Uuid) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    pub fn expense_mut(&mut self, id: Uuid) -> Option<&mut Expense> {
        self.expenses.iter_mut().find(|expense| expense.id == id)
    }

    pub fn transaction(&self, id: Uuid) -> Option<&BankTransaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn transaction_mut(&mut self, id: Uuid) -> Option<&mut BankTransaction> {
        self.transactions.iter_mut().find(|txn| txn.id == id)
    }

    pub fn links_for_transaction(&self, transaction_id: Uuid) -> Vec<&ReconciliationLink> {
        self.links
            .iter()
            .filter(|link| link.transaction_id == transaction_id)
            .collect()
    }

    pub fn links_for_target(&self, target: LinkTarget) -> Vec<&ReconciliationLink> {
        self.links.iter().filter(|link| link.target == target).collect()
    }

    /// Re-derives an expense's flag and back-reference from the links still
    /// pointing at it. The back-reference follows the earliest remaining link.
    pub fn refresh_expense_reconciliation(&mut self, expense_id: Uuid) {
        let remaining = self
            .links_for_target(LinkTarget::Expense(expense_id))
            .first()
            .map(|link| link.transaction_id);
        if let Some(expense) = self.expense_mut(expense_id) {
            match remaining {
                Some(transaction_id) => expense.mark_reconciled(transaction_id),
                None => expense.clear_reconciliation(),
            }
        }
    }

    /// Removes a bank transaction and every link that references it.
    pub fn remove_transaction(&mut self, id: Uuid) -> Option<BankTransaction> {
        let idx = self.transactions.iter().position(|txn| txn.id == id)?;
        let removed = self.transactions.remove(idx);
        let detached = self.drain_links(|link| link.transaction_id == id);
        for expense_id in detached.iter().filter_map(ReconciliationLink::expense_id) {
            self.refresh_expense_reconciliation(expense_id);
        }
        self.touch();
        Some(removed)
    }

    /// Removes an expense and its links; transactions left without links
    /// fall back to unreconciled.
    pub fn remove_expense(&mut self, id: Uuid) -> Option<Expense> {
        let idx = self.expenses.iter().position(|expense| expense.id == id)?;
        let removed = self.expenses.remove(idx);
        let detached = self.drain_links(|link| link.target == LinkTarget::Expense(id));
        self.release_orphaned_transactions(&detached);
        self.touch();
        Some(removed)
    }

    pub fn remove_document(&mut self, id: Uuid) -> Option<QuoteDocument> {
        let idx = self.documents.iter().position(|doc| doc.id == id)?;
        let removed = self.documents.remove(idx);
        let detached = self.drain_links(|link| link.target == LinkTarget::Invoice(id));
        self.release_orphaned_transactions(&detached);
        self.touch();
        Some(removed)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }

    fn drain_links<F>(&mut self, predicate: F) -> Vec<ReconciliationLink>
    where
        F: Fn(&ReconciliationLink) -> bool,
    {
        let (detached, kept): (Vec<_>, Vec<_>) =
            self.links.drain(..).partition(|link| predicate(link));
        self.links = kept;
        detached
    }

    fn release_orphaned_transactions(&mut self, detached: &[ReconciliationLink]) {
        for link in detached {
            let still_linked = self
                .links
                .iter()
                .any(|other| other.transaction_id == link.transaction_id);
            if let Some(txn) = self.transaction_mut(link.transaction_id) {
                if still_linked {
                    if txn.reconciled_expense_id == link.expense_id() {
                        txn.reconciled_expense_id = None;
                    }
                    if txn.reconciled_invoice_id == link.invoice_id() {
                        txn.reconciled_invoice_id = None;
                    }
                } else {
                    txn.clear_reconciliation();
                }
            }
        }
    }
}

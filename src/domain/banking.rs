use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Amounted, Displayable, Identifiable};

/// A line imported from a bank statement. Negative amounts are payments,
/// positive amounts are receipts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankTransaction {
    pub id: Uuid,
    pub amount: f64,
    pub transaction_date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_reconciled: bool,
    /// Legacy single-link back-references, kept in sync with the first link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconciled_expense_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconciled_invoice_id: Option<Uuid>,
}

impl BankTransaction {
    pub fn new(amount: f64, transaction_date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            transaction_date,
            description: description.into(),
            is_reconciled: false,
            reconciled_expense_id: None,
            reconciled_invoice_id: None,
        }
    }

    pub fn is_outgoing(&self) -> bool {
        self.amount < 0.0
    }

    pub fn is_incoming(&self) -> bool {
        self.amount > 0.0
    }

    pub fn magnitude(&self) -> f64 {
        self.amount.abs()
    }

    pub fn clear_reconciliation(&mut self) {
        self.is_reconciled = false;
        self.reconciled_expense_id = None;
        self.reconciled_invoice_id = None;
    }
}

impl Identifiable for BankTransaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Amounted for BankTransaction {
    fn amount(&self) -> f64 {
        self.amount
    }
}

impl Displayable for BankTransaction {
    fn display_label(&self) -> String {
        format!(
            "txn:{} {} {:.2} {}",
            self.id, self.transaction_date, self.amount, self.description
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub amount: f64,
    pub expense_date: NaiveDate,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub category: String,
    /// Recorded VAT portion. Informational; matching does not read it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_amount: Option<f64>,
    #[serde(default)]
    pub is_reconciled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconciled_transaction_id: Option<Uuid>,
}

impl Expense {
    pub fn new(
        amount: f64,
        expense_date: NaiveDate,
        vendor: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            expense_date,
            vendor: vendor.into(),
            category: category.into(),
            vat_amount: None,
            is_reconciled: false,
            reconciled_transaction_id: None,
        }
    }

    pub fn mark_reconciled(&mut self, transaction_id: Uuid) {
        self.is_reconciled = true;
        self.reconciled_transaction_id = Some(transaction_id);
    }

    pub fn clear_reconciliation(&mut self) {
        self.is_reconciled = false;
        self.reconciled_transaction_id = None;
    }
}

impl Identifiable for Expense {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Amounted for Expense {
    fn amount(&self) -> f64 {
        self.amount
    }
}

impl Displayable for Expense {
    fn display_label(&self) -> String {
        format!(
            "expense:{} {} {:.2} {} ({})",
            self.id, self.expense_date, self.amount, self.vendor, self.category
        )
    }
}

/// The record a link settles against. Exactly one per link.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum LinkTarget {
    Expense(Uuid),
    Invoice(Uuid),
}

impl LinkTarget {
    pub fn expense_id(&self) -> Option<Uuid> {
        match self {
            LinkTarget::Expense(id) => Some(*id),
            LinkTarget::Invoice(_) => None,
        }
    }

    pub fn invoice_id(&self) -> Option<Uuid> {
        match self {
            LinkTarget::Invoice(id) => Some(*id),
            LinkTarget::Expense(_) => None,
        }
    }
}

impl fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkTarget::Expense(id) => write!(f, "expense:{id}"),
            LinkTarget::Invoice(id) => write!(f, "invoice:{id}"),
        }
    }
}

/// Join row attributing part of a bank transaction to one expense or invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationLink {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub target: LinkTarget,
    pub amount_matched: f64,
    pub created_at: DateTime<Utc>,
}

impl ReconciliationLink {
    pub fn new(transaction_id: Uuid, target: LinkTarget, amount_matched: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            transaction_id,
            target,
            amount_matched,
            created_at: Utc::now(),
        }
    }

    pub fn expense_id(&self) -> Option<Uuid> {
        self.target.expense_id()
    }

    pub fn invoice_id(&self) -> Option<Uuid> {
        self.target.invoice_id()
    }
}

impl Identifiable for ReconciliationLink {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum MatchConfidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for MatchConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchConfidence::High => "high",
            MatchConfidence::Medium => "medium",
            MatchConfidence::Low => "low",
        };
        f.write_str(label)
    }
}

/// A proposed pairing produced by the matcher. Read-only until accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedMatch {
    pub transaction: BankTransaction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense: Option<Expense>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice: Option<crate::domain::quote::QuoteDocument>,
    pub confidence: MatchConfidence,
    pub reason: String,
}

impl SuggestedMatch {
    pub fn target(&self) -> Option<LinkTarget> {
        if let Some(expense) = &self.expense {
            return Some(LinkTarget::Expense(expense.id));
        }
        self.invoice
            .as_ref()
            .map(|invoice| LinkTarget::Invoice(invoice.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_target_serializes_with_kind_tag() {
        let id = Uuid::nil();
        let json = serde_json::to_string(&LinkTarget::Expense(id)).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"expense","id":"00000000-0000-0000-0000-000000000000"}"#
        );
    }

    #[test]
    fn link_exposes_exactly_one_side() {
        let link = ReconciliationLink::new(Uuid::new_v4(), LinkTarget::Invoice(Uuid::nil()), 10.0);
        assert!(link.expense_id().is_none());
        assert_eq!(link.invoice_id(), Some(Uuid::nil()));
    }

    #[test]
    fn confidence_orders_low_to_high() {
        assert!(MatchConfidence::High > MatchConfidence::Medium);
        assert!(MatchConfidence::Medium > MatchConfidence::Low);
    }

    #[test]
    fn direction_follows_sign() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(BankTransaction::new(-10.0, date, "card").is_outgoing());
        assert!(BankTransaction::new(10.0, date, "bacs").is_incoming());
        let zero = BankTransaction::new(0.0, date, "fee reversal");
        assert!(!zero.is_outgoing() && !zero.is_incoming());
    }
}

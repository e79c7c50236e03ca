//! Heuristic pairing of bank lines with expenses and paid invoices.
//!
//! Outgoing lines are compared against unreconciled expenses, either at face
//! value or grossed up by a fixed VAT factor; incoming lines are compared
//! against paid invoices. The first qualifying candidate in iteration order
//! wins. There is no best-fit ranking.

use chrono::NaiveDate;

use crate::config::MatchingSettings;
use crate::domain::{
    common::days_between, BankTransaction, Expense, MatchConfidence, QuoteDocument,
    SuggestedMatch,
};

/// How an expense amount lined up with the bank line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountRule {
    Exact,
    VatGrossed,
}

/// Produces at most one suggestion per unreconciled transaction, in input order.
pub fn suggest_matches(
    transactions: &[BankTransaction],
    expenses: &[Expense],
    invoices: &[QuoteDocument],
    settings: &MatchingSettings,
) -> Vec<SuggestedMatch> {
    let open_expenses: Vec<&Expense> = expenses.iter().filter(|e| !e.is_reconciled).collect();
    let paid_invoices: Vec<&QuoteDocument> = invoices
        .iter()
        .filter(|invoice| invoice.is_settled_invoice())
        .collect();

    transactions
        .iter()
        .filter(|txn| !txn.is_reconciled)
        .filter_map(|txn| {
            if txn.is_outgoing() {
                match_expense(txn, &open_expenses, settings)
            } else if txn.is_incoming() {
                match_invoice(txn, &paid_invoices, settings)
            } else {
                None
            }
        })
        .collect()
}

/// Checks a single expense against an outgoing transaction.
pub fn expense_amount_rule(
    transaction: &BankTransaction,
    expense: &Expense,
    settings: &MatchingSettings,
) -> Option<AmountRule> {
    let paid = transaction.magnitude();
    if (paid - expense.amount).abs() < settings.amount_tolerance {
        Some(AmountRule::Exact)
    } else if (paid - expense.amount * settings.vat_gross_up_factor).abs()
        < settings.amount_tolerance
    {
        Some(AmountRule::VatGrossed)
    } else {
        None
    }
}

pub fn expense_confidence(
    rule: AmountRule,
    days: i64,
    settings: &MatchingSettings,
) -> MatchConfidence {
    if rule == AmountRule::Exact && days <= settings.expense_high_confidence_days {
        MatchConfidence::High
    } else if days <= settings.expense_medium_confidence_days {
        MatchConfidence::Medium
    } else {
        MatchConfidence::Low
    }
}

pub fn invoice_confidence(days: i64, settings: &MatchingSettings) -> MatchConfidence {
    if days <= settings.invoice_high_confidence_days {
        MatchConfidence::High
    } else if days <= settings.invoice_medium_confidence_days {
        MatchConfidence::Medium
    } else {
        MatchConfidence::Low
    }
}

/// Settlement date used for an invoice: the day it was last updated (marked paid).
pub fn invoice_settlement_date(invoice: &QuoteDocument) -> NaiveDate {
    invoice.updated_at.date_naive()
}

fn match_expense(
    transaction: &BankTransaction,
    expenses: &[&Expense],
    settings: &MatchingSettings,
) -> Option<SuggestedMatch> {
    expenses.iter().find_map(|expense| {
        let days = days_between(transaction.transaction_date, expense.expense_date);
        if days > settings.expense_window_days {
            return None;
        }
        let rule = expense_amount_rule(transaction, expense, settings)?;
        let confidence = expense_confidence(rule, days, settings);
        let reason = match rule {
            AmountRule::Exact => format!(
                "Amount {:.2} matches expense from {} ({} day(s) apart)",
                expense.amount, expense.vendor, days
            ),
            AmountRule::VatGrossed => format!(
                "Amount {:.2} matches expense {:.2} from {} plus VAT ({} day(s) apart)",
                transaction.magnitude(),
                expense.amount,
                expense.vendor,
                days
            ),
        };
        Some(SuggestedMatch {
            transaction: transaction.clone(),
            expense: Some((*expense).clone()),
            invoice: None,
            confidence,
            reason,
        })
    })
}

fn match_invoice(
    transaction: &BankTransaction,
    invoices: &[&QuoteDocument],
    settings: &MatchingSettings,
) -> Option<SuggestedMatch> {
    invoices.iter().find_map(|invoice| {
        if (transaction.amount - invoice.total).abs() >= settings.amount_tolerance {
            return None;
        }
        let days = days_between(transaction.transaction_date, invoice_settlement_date(invoice));
        if days > settings.invoice_window_days {
            return None;
        }
        Some(SuggestedMatch {
            transaction: transaction.clone(),
            expense: None,
            invoice: Some((*invoice).clone()),
            confidence: invoice_confidence(days, settings),
            reason: format!(
                "Receipt {:.2} matches paid invoice {} for {} ({} day(s) apart)",
                transaction.amount, invoice.reference, invoice.client_name, days
            ),
        })
    })
}

//! Accepting, replacing and clearing bank reconciliations.
//!
//! A transaction is reconciled as soon as it carries at least one link. The
//! links record how much of the transaction each item accounts for, but the
//! transaction flag itself stays binary; [`AllocationSummary`] reports any
//! unallocated remainder without changing the flag.

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::config::MatchingSettings;
use crate::core::matching::suggest_matches;
use crate::core::services::{apply_staged, ServiceError, ServiceResult};
use crate::domain::{Amounted, Book, LinkTarget, ReconciliationLink, SuggestedMatch};
use crate::errors::BookError;

/// Portion of a bank line explained by its links.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationSummary {
    pub transaction_id: Uuid,
    pub transaction_amount: f64,
    pub matched_total: f64,
    pub unallocated: f64,
    pub link_count: usize,
    pub is_reconciled: bool,
}

pub struct ReconciliationService;

impl ReconciliationService {
    /// Runs the matcher over the book's open transactions, expenses and paid invoices.
    pub fn suggestions(book: &Book, settings: &MatchingSettings) -> Vec<SuggestedMatch> {
        let suggestions = suggest_matches(
            &book.transactions,
            &book.expenses,
            &book.documents,
            settings,
        );
        tracing::debug!(
            transactions = book.transactions.len(),
            suggestions = suggestions.len(),
            "reconciliation suggestions computed"
        );
        suggestions
    }

    /// Accepts a single suggestion: one link, both sides marked reconciled.
    pub fn accept(book: &mut Book, suggestion: &SuggestedMatch) -> ServiceResult<ReconciliationLink> {
        let transaction_id = suggestion.transaction.id;
        let target = suggestion.target().ok_or_else(|| {
            ServiceError::Invalid("suggestion does not reference an expense or invoice".into())
        })?;
        Self::link(book, transaction_id, target)
    }

    /// Adds one link for `target` to the transaction, keeping any existing links.
    pub fn link(
        book: &mut Book,
        transaction_id: Uuid,
        target: LinkTarget,
    ) -> ServiceResult<ReconciliationLink> {
        ensure_transaction(book, transaction_id)?;
        let amount = target_amount(book, target)?;

        let link = apply_staged(book, |staged| {
            staged
                .links
                .retain(|l| !(l.transaction_id == transaction_id && l.target == target));
            let link = ReconciliationLink::new(transaction_id, target, amount);
            staged.links.push(link.clone());
            mark_target(staged, target);
            refresh_transaction_flags(staged, transaction_id);
            Ok(link)
        })?;
        tracing::info!(transaction = %transaction_id, target = %target, "reconciliation accepted");
        Ok(link)
    }

    /// Replaces every link of the transaction with links to the given items.
    ///
    /// Each link records the full amount of its item. Running the same call
    /// twice leaves the same state because prior links are cleared first.
    pub fn reconcile_multi(
        book: &mut Book,
        transaction_id: Uuid,
        expense_ids: &[Uuid],
        invoice_ids: &[Uuid],
    ) -> ServiceResult<Vec<ReconciliationLink>> {
        ensure_transaction(book, transaction_id)?;

        let mut targets = Vec::new();
        let mut seen = HashSet::new();
        let requested = expense_ids
            .iter()
            .map(|id| LinkTarget::Expense(*id))
            .chain(invoice_ids.iter().map(|id| LinkTarget::Invoice(*id)));
        for target in requested {
            if seen.insert(target) {
                targets.push((target, target_amount(book, target)?));
            }
        }

        let links = apply_staged(book, |staged| {
            release_links(staged, transaction_id);
            let mut created = Vec::with_capacity(targets.len());
            for (target, amount) in &targets {
                let link = ReconciliationLink::new(transaction_id, *target, *amount);
                staged.links.push(link.clone());
                mark_target(staged, *target);
                created.push(link);
            }
            refresh_transaction_flags(staged, transaction_id);
            Ok(created)
        })?;

        tracing::info!(
            transaction = %transaction_id,
            links = links.len(),
            "transaction reconciled against selected items"
        );
        Ok(links)
    }

    /// Deletes every link of the transaction and reopens it and its expenses.
    /// Linked invoices stay paid.
    pub fn unreconcile(book: &mut Book, transaction_id: Uuid) -> ServiceResult<usize> {
        ensure_transaction(book, transaction_id)?;
        let removed = apply_staged(book, |staged| {
            let removed = release_links(staged, transaction_id);
            if let Some(txn) = staged.transaction_mut(transaction_id) {
                txn.clear_reconciliation();
            }
            Ok(removed)
        })?;
        tracing::info!(transaction = %transaction_id, removed, "reconciliation cleared");
        Ok(removed)
    }

    pub fn links(book: &Book, transaction_id: Uuid) -> ServiceResult<Vec<&ReconciliationLink>> {
        ensure_transaction(book, transaction_id)?;
        Ok(book.links_for_transaction(transaction_id))
    }

    pub fn allocation(book: &Book, transaction_id: Uuid) -> ServiceResult<AllocationSummary> {
        let txn = book
            .transaction(transaction_id)
            .ok_or(BookError::TransactionNotFound(transaction_id))?;
        let links = book.links_for_transaction(transaction_id);
        let matched_total: f64 = links.iter().map(|link| link.amount_matched).sum();
        Ok(AllocationSummary {
            transaction_id,
            transaction_amount: txn.amount,
            matched_total,
            unallocated: txn.magnitude() - matched_total,
            link_count: links.len(),
            is_reconciled: txn.is_reconciled,
        })
    }
}

fn ensure_transaction(book: &Book, transaction_id: Uuid) -> ServiceResult<()> {
    book.transaction(transaction_id)
        .map(|_| ())
        .ok_or_else(|| BookError::TransactionNotFound(transaction_id).into())
}

fn target_amount(book: &Book, target: LinkTarget) -> ServiceResult<f64> {
    match target {
        LinkTarget::Expense(id) => book
            .expense(id)
            .map(Amounted::amount)
            .ok_or_else(|| BookError::ExpenseNotFound(id).into()),
        LinkTarget::Invoice(id) => book
            .invoice(id)
            .map(Amounted::amount)
            .ok_or_else(|| BookError::InvoiceNotFound(id).into()),
    }
}

fn mark_target(book: &mut Book, target: LinkTarget) {
    if let LinkTarget::Expense(id) = target {
        book.refresh_expense_reconciliation(id);
    }
}

/// Drops the transaction's links. Expenses another transaction still covers
/// stay reconciled and point back at that transaction; the rest reopen.
fn release_links(book: &mut Book, transaction_id: Uuid) -> usize {
    let before = book.links.len();
    let released: Vec<LinkTarget> = book
        .links
        .iter()
        .filter(|link| link.transaction_id == transaction_id)
        .map(|link| link.target)
        .collect();
    book.links.retain(|link| link.transaction_id != transaction_id);

    let mut expense_ids: Vec<Uuid> = released.iter().filter_map(LinkTarget::expense_id).collect();
    if let Some(legacy) = book
        .transaction(transaction_id)
        .and_then(|txn| txn.reconciled_expense_id)
    {
        expense_ids.push(legacy);
    }
    for id in expense_ids {
        book.refresh_expense_reconciliation(id);
    }
    before - book.links.len()
}

/// Derives the transaction flag and legacy back-references from its links.
fn refresh_transaction_flags(book: &mut Book, transaction_id: Uuid) {
    let links = book.links_for_transaction(transaction_id);
    let is_reconciled = !links.is_empty();
    let first_expense = links.iter().find_map(|link| link.expense_id());
    let first_invoice = links.iter().find_map(|link| link.invoice_id());
    if let Some(txn) = book.transaction_mut(transaction_id) {
        txn.is_reconciled = is_reconciled;
        txn.reconciled_expense_id = first_expense;
        txn.reconciled_invoice_id = first_invoice;
    }
}

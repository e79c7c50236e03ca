//! Business logic helpers for bank lines and expenses.

use uuid::Uuid;

use crate::core::services::ServiceResult;
use crate::domain::{BankTransaction, Book, Expense};
use crate::errors::BookError;

/// Provides validated CRUD helpers for bank transactions and expenses.
pub struct BankingService;

impl BankingService {
    pub fn add_transaction(book: &mut Book, transaction: BankTransaction) -> ServiceResult<Uuid> {
        Ok(book.add_transaction(transaction))
    }

    /// Removes a bank line; its links go with it and linked expenses reopen.
    pub fn remove_transaction(book: &mut Book, id: Uuid) -> ServiceResult<BankTransaction> {
        let removed = book
            .remove_transaction(id)
            .ok_or(BookError::TransactionNotFound(id))?;
        tracing::debug!(transaction = %id, "bank transaction removed");
        Ok(removed)
    }

    pub fn add_expense(book: &mut Book, expense: Expense) -> ServiceResult<Uuid> {
        Ok(book.add_expense(expense))
    }

    /// Updates the expense identified by `id` via the provided mutator.
    pub fn update_expense<F>(book: &mut Book, id: Uuid, mutator: F) -> ServiceResult<()>
    where
        F: FnOnce(&mut Expense),
    {
        let expense = book.expense_mut(id).ok_or(BookError::ExpenseNotFound(id))?;
        mutator(expense);
        book.touch();
        Ok(())
    }

    pub fn remove_expense(book: &mut Book, id: Uuid) -> ServiceResult<Expense> {
        let removed = book
            .remove_expense(id)
            .ok_or(BookError::ExpenseNotFound(id))?;
        tracing::debug!(expense = %id, "expense removed");
        Ok(removed)
    }

    pub fn unreconciled_transactions(book: &Book) -> Vec<&BankTransaction> {
        book.transactions
            .iter()
            .filter(|txn| !txn.is_reconciled)
            .collect()
    }

    pub fn unreconciled_expenses(book: &Book) -> Vec<&Expense> {
        book.expenses
            .iter()
            .filter(|expense| !expense.is_reconciled)
            .collect()
    }
}

mod common;

use chrono::{Duration, Utc};
use common::setup_test_env;
use tradebook_core::{
    core::services::{QuoteService, ReconciliationService},
    domain::{BankTransaction, Expense, LineItem, MatchConfidence, QuoteDocument, Section},
    errors::BookError,
};

#[test]
fn month_end_reconciliation_round_trip() {
    let (mut manager, config_manager) = setup_test_env();
    let config = config_manager.load().expect("default config");
    manager.create("Harris Joinery").expect("create book");

    let today = Utc::now().date_naive();
    let options = config.calculation_options();
    let (fuel_txn, fuel, timber_txn, timber, receipt, invoice) = manager
        .apply_and_persist(|book| {
            let fuel_txn = book.add_transaction(BankTransaction::new(-54.0, today, "Shell"));
            let fuel = book.add_expense(Expense::new(45.0, today - Duration::days(1), "Shell", "Fuel"));
            let timber_txn = book.add_transaction(BankTransaction::new(-230.0, today, "Travis"));
            let timber = book.add_expense(Expense::new(230.0, today, "Travis", "Materials"));

            let mut doc = QuoteDocument::invoice("INV-31", "Patel").with_section(
                Section::new("Decking").with_item(LineItem::new("Boards", 20.0, 25.0)),
            );
            doc.tax_percent = Some(20.0);
            let invoice = QuoteService::add(book, doc)?;
            let total = QuoteService::mark_paid(book, invoice, &options)?;
            let receipt = book.add_transaction(BankTransaction::new(total, today, "BACS PATEL"));
            Ok((fuel_txn, fuel, timber_txn, timber, receipt, invoice))
        })
        .expect("seed book");

    let suggestions = manager.suggestions(&config.matching).expect("suggestions");
    assert_eq!(suggestions.len(), 3);
    let by_txn = |id| {
        suggestions
            .iter()
            .find(|s| s.transaction.id == id)
            .expect("suggestion for transaction")
    };
    assert_eq!(by_txn(fuel_txn).confidence, MatchConfidence::Medium);
    assert_eq!(by_txn(timber_txn).confidence, MatchConfidence::High);
    assert_eq!(by_txn(receipt).confidence, MatchConfidence::High);
    assert_eq!(
        by_txn(receipt).invoice.as_ref().map(|doc| doc.id),
        Some(invoice)
    );

    for suggestion in &suggestions {
        manager.accept(suggestion).expect("accept suggestion");
    }
    assert!(manager
        .suggestions(&config.matching)
        .expect("suggestions after accept")
        .is_empty());

    manager.clear();
    let book = manager.load("Harris Joinery").expect("reload");
    assert_eq!(book.links.len(), 3);
    assert!(book.expense(fuel).unwrap().is_reconciled);
    assert!(book.expense(timber).unwrap().is_reconciled);
    let grossed = ReconciliationService::allocation(book, fuel_txn).unwrap();
    assert!((grossed.unallocated - 9.0).abs() < 1e-9);

    manager.unreconcile(fuel_txn).expect("unreconcile fuel");
    let book = manager.book().unwrap();
    assert!(!book.transaction(fuel_txn).unwrap().is_reconciled);
    assert!(!book.expense(fuel).unwrap().is_reconciled);
    assert_eq!(book.links.len(), 2);
}

#[test]
fn split_payment_covers_two_expenses() {
    let (mut manager, _config) = setup_test_env();
    manager.create("splits").unwrap();
    let today = Utc::now().date_naive();
    let (txn, a, b) = manager
        .apply_and_persist(|book| {
            let txn = book.add_transaction(BankTransaction::new(-150.0, today, "Merchant"));
            let a = book.add_expense(Expense::new(100.0, today, "Merchant", "Tools"));
            let b = book.add_expense(Expense::new(50.0, today, "Merchant", "Fixings"));
            Ok((txn, a, b))
        })
        .unwrap();

    let links = manager.reconcile_multi(txn, &[a, b], &[]).unwrap();
    assert_eq!(links.len(), 2);
    let again = manager.reconcile_multi(txn, &[a, b], &[]).unwrap();
    assert_eq!(again.len(), 2);

    let book = manager.book().unwrap();
    assert_eq!(book.links.len(), 2);
    let summary = ReconciliationService::allocation(book, txn).unwrap();
    assert!(summary.is_reconciled);
    assert!(summary.unallocated.abs() < 1e-9);
}

#[test]
fn unknown_ids_surface_not_found() {
    let (mut manager, _config) = setup_test_env();
    manager.create("missing").unwrap();
    let err = manager
        .reconcile_multi(uuid::Uuid::new_v4(), &[], &[])
        .unwrap_err();
    assert!(matches!(err, BookError::TransactionNotFound(_)));
    assert!(err.is_not_found());
}

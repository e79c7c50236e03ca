use assert_cmd::Command;
use chrono::Utc;
use predicates::str::contains;
use std::path::Path;
use tempfile::TempDir;
use tradebook_core::{
    domain::{LineItem, QuoteDocument, Section},
    storage::{BookStorage, JsonBookStorage},
};

fn cli(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tradebook_cli").unwrap();
    cmd.env("TRADEBOOK_HOME", home).env("NO_COLOR", "1");
    cmd
}

fn storage(home: &Path) -> JsonBookStorage {
    JsonBookStorage::new(home.join("books"), home.join("backups")).unwrap()
}

#[test]
fn help_lists_reconciliation_commands() {
    let home = TempDir::new().unwrap();
    cli(home.path())
        .arg("help")
        .assert()
        .success()
        .stdout(contains("suggest"))
        .stdout(contains("unreconcile"));
}

#[test]
fn unknown_command_fails_with_error_prefix() {
    let home = TempDir::new().unwrap();
    cli(home.path())
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(contains("Error: Invalid input: unknown command"));
}

#[test]
fn bad_transaction_id_is_rejected() {
    let home = TempDir::new().unwrap();
    cli(home.path()).args(["new", "shop"]).assert().success();
    cli(home.path())
        .args(["links", "shop", "not-a-uuid"])
        .assert()
        .failure()
        .stderr(contains("not a valid transaction id"));
}

#[test]
fn expense_flow_suggest_accept_unreconcile() {
    let home = TempDir::new().unwrap();
    let today = Utc::now().date_naive().to_string();

    cli(home.path())
        .args(["new", "joinery"])
        .assert()
        .success()
        .stdout(contains("Created book"));
    cli(home.path())
        .args(["add-transaction", "joinery", "-120", &today, "Card", "payment"])
        .assert()
        .success();
    cli(home.path())
        .args(["add-expense", "joinery", "100", &today, "Wickes", "Materials"])
        .assert()
        .success();

    let txn = storage(home.path()).load_book("joinery").unwrap().transactions[0].id;

    cli(home.path())
        .args(["suggest", "joinery"])
        .assert()
        .success()
        .stdout(contains("medium"))
        .stdout(contains("plus VAT"));
    cli(home.path())
        .args(["accept", "joinery", &txn.to_string()])
        .assert()
        .success()
        .stdout(contains("Reconciled"));
    cli(home.path())
        .args(["links", "joinery", &txn.to_string()])
        .assert()
        .success()
        .stdout(contains("unallocated £20.00"));

    let book = storage(home.path()).load_book("joinery").unwrap();
    assert!(book.transactions[0].is_reconciled);
    assert!(book.expenses[0].is_reconciled);

    cli(home.path())
        .args(["unreconcile", "joinery", &txn.to_string()])
        .assert()
        .success()
        .stdout(contains("Removed 1 link(s)"));
    let book = storage(home.path()).load_book("joinery").unwrap();
    assert!(book.links.is_empty());
    assert!(!book.expenses[0].is_reconciled);
}

#[test]
fn invoice_totals_and_multi_reconcile() {
    let home = TempDir::new().unwrap();
    cli(home.path()).args(["new", "decking"]).assert().success();

    let mut invoice = QuoteDocument::invoice("INV-7", "Patel").with_section(
        Section::new("Decking").with_item(LineItem::new("Boards", 20.0, 25.0)),
    );
    invoice.tax_percent = Some(20.0);
    let doc_path = home.path().join("invoice.json");
    std::fs::write(&doc_path, serde_json::to_string(&invoice).unwrap()).unwrap();

    cli(home.path())
        .args(["add-document", "decking", doc_path.to_str().unwrap()])
        .assert()
        .success();
    let id = invoice.id.to_string();
    cli(home.path())
        .args(["totals", "decking", &id])
        .assert()
        .success()
        .stdout(contains("Grand total"))
        .stdout(contains("£600.00"));
    cli(home.path())
        .args(["mark-paid", "decking", &id])
        .assert()
        .success()
        .stdout(contains("£600.00"));

    let today = Utc::now().date_naive().to_string();
    cli(home.path())
        .args(["add-transaction", "decking", "600", &today, "BACS"])
        .assert()
        .success();
    let txn = storage(home.path()).load_book("decking").unwrap().transactions[0]
        .id
        .to_string();

    cli(home.path())
        .args(["reconcile", "decking", &txn, "--invoice", &id])
        .assert()
        .success()
        .stdout(contains("against 1 item(s)"));
    cli(home.path())
        .args(["reconcile", "decking", &txn, "--invoice", &id])
        .assert()
        .success();

    let book = storage(home.path()).load_book("decking").unwrap();
    assert_eq!(book.links.len(), 1);
    assert!(book.transactions[0].is_reconciled);
}

#[test]
fn config_set_persists_and_snapshots_previous_settings() {
    let home = TempDir::new().unwrap();
    cli(home.path())
        .args(["config", "set", "expense_window_days", "10"])
        .assert()
        .success()
        .stdout(contains("expense_window_days set to 10"));
    cli(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("expense_window_days"))
        .stdout(contains("10"));
    cli(home.path())
        .args(["config", "backups"])
        .assert()
        .success()
        .stdout(contains("_before-expense-window-days.json"));
    cli(home.path())
        .args(["config", "set", "enable_vat", "sometimes"])
        .assert()
        .failure()
        .stderr(contains("not a valid value"));
}

#[test]
fn book_root_setting_moves_new_books() {
    let home = TempDir::new().unwrap();
    let shared = TempDir::new().unwrap();
    let root = shared.path().join("books");
    cli(home.path())
        .args(["config", "set", "book_root", root.to_str().unwrap()])
        .assert()
        .success();
    cli(home.path()).args(["new", "yard"]).assert().success();
    assert!(root.join("yard.json").exists());
}

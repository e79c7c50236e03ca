use chrono::NaiveDate;

use crate::cli::commands::{usage_error, CommandDefinition, CommandResult};
use crate::cli::context::CliContext;
use crate::cli::output;
use crate::core::services::BankingService;
use crate::domain::{Amounted, BankTransaction, Displayable, Expense};
use crate::errors::CliError;

const ADD_TRANSACTION_USAGE: &str = "add-transaction <book> <amount> <YYYY-MM-DD> [description]";
const ADD_EXPENSE_USAGE: &str = "add-expense <book> <amount> <YYYY-MM-DD> <vendor> [category]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "add-transaction",
            "Record a bank line (negative = payment)",
            ADD_TRANSACTION_USAGE,
            cmd_add_transaction,
        ),
        CommandDefinition::new(
            "add-expense",
            "Record an expense",
            ADD_EXPENSE_USAGE,
            cmd_add_expense,
        ),
        CommandDefinition::new(
            "unmatched",
            "List unreconciled bank lines and expenses",
            "unmatched <book>",
            cmd_unmatched,
        ),
    ]
}

fn cmd_add_transaction(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let (name, amount, date, description) = match args {
        [name, amount, date, rest @ ..] => (*name, *amount, *date, rest.join(" ")),
        _ => return Err(usage_error(ADD_TRANSACTION_USAGE)),
    };
    let transaction = BankTransaction::new(parse_amount(amount)?, parse_date(date)?, description);
    context.open(name)?;
    let id = context
        .manager
        .apply_and_persist(|book| BankingService::add_transaction(book, transaction))?;
    output::success(format!("Added transaction {id}"));
    Ok(())
}

fn cmd_add_expense(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let (name, amount, date, vendor, category) = match args {
        [name, amount, date, vendor] => (*name, *amount, *date, *vendor, "General"),
        [name, amount, date, vendor, category] => (*name, *amount, *date, *vendor, *category),
        _ => return Err(usage_error(ADD_EXPENSE_USAGE)),
    };
    let expense = Expense::new(parse_amount(amount)?, parse_date(date)?, vendor, category);
    context.open(name)?;
    let id = context
        .manager
        .apply_and_persist(|book| BankingService::add_expense(book, expense))?;
    output::success(format!("Added expense {id}"));
    Ok(())
}

fn cmd_unmatched(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let [name] = args else {
        return Err(usage_error("unmatched <book>"));
    };
    context.open(name)?;
    let book = context.manager.book()?;

    output::section("Unreconciled transactions");
    for txn in BankingService::unreconciled_transactions(book) {
        output::info(format!(
            "  {:>12}  {}",
            context.money(txn.amount()),
            txn.display_label()
        ));
    }
    output::section("Unreconciled expenses");
    for expense in BankingService::unreconciled_expenses(book) {
        output::info(format!(
            "  {:>12}  {}",
            context.money(expense.amount()),
            expense.display_label()
        ));
    }
    Ok(())
}

pub(crate) fn parse_amount(raw: &str) -> Result<f64, CliError> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CliError::Input(format!("`{raw}` is not a valid amount")))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| CliError::Input(format!("`{raw}` is not a YYYY-MM-DD date")))
}

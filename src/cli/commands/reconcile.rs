use colored::Colorize;
use uuid::Uuid;

use crate::cli::commands::{parse_id, usage_error, CommandDefinition, CommandResult};
use crate::cli::context::CliContext;
use crate::cli::output;
use crate::core::services::ReconciliationService;
use crate::domain::{Displayable, LinkTarget, MatchConfidence, SuggestedMatch};
use crate::errors::CliError;

const RECONCILE_USAGE: &str =
    "reconcile <book> <transaction-id> [--expense <id>]... [--invoice <id>]...";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "suggest",
            "List suggested matches for unreconciled bank lines",
            "suggest <book>",
            cmd_suggest,
        ),
        CommandDefinition::new(
            "accept",
            "Accept the suggested match for a bank line",
            "accept <book> <transaction-id>",
            cmd_accept,
        ),
        CommandDefinition::new(
            "reconcile",
            "Replace a bank line's links with the given items",
            RECONCILE_USAGE,
            cmd_reconcile,
        ),
        CommandDefinition::new(
            "unreconcile",
            "Remove every link from a bank line",
            "unreconcile <book> <transaction-id>",
            cmd_unreconcile,
        ),
        CommandDefinition::new(
            "links",
            "Show a bank line's links and unallocated remainder",
            "links <book> <transaction-id>",
            cmd_links,
        ),
    ]
}

fn cmd_suggest(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let [name] = args else {
        return Err(usage_error("suggest <book>"));
    };
    let settings = context.config.matching.clone();
    context.open(name)?;
    let suggestions = context.manager.suggestions(&settings)?;
    if suggestions.is_empty() {
        output::info("No suggestions.");
        return Ok(());
    }
    output::section(format!("{} suggestion(s)", suggestions.len()));
    for suggestion in &suggestions {
        output::info(format!(
            "  {} [{}] {}",
            suggestion.transaction.id,
            confidence_label(suggestion.confidence),
            suggestion.reason
        ));
    }
    Ok(())
}

fn cmd_accept(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let [name, raw_id] = args else {
        return Err(usage_error("accept <book> <transaction-id>"));
    };
    let transaction_id = parse_id(raw_id, "transaction")?;
    let settings = context.config.matching.clone();
    context.open(name)?;
    let suggestion: SuggestedMatch = context
        .manager
        .suggestions(&settings)?
        .into_iter()
        .find(|suggestion| suggestion.transaction.id == transaction_id)
        .ok_or_else(|| {
            CliError::Command(format!("no suggestion for transaction {transaction_id}"))
        })?;
    let link = context.manager.accept(&suggestion)?;
    output::success(format!(
        "Reconciled {} with {} ({})",
        transaction_id,
        link.target,
        context.money(link.amount_matched)
    ));
    Ok(())
}

fn cmd_reconcile(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let (name, raw_id, flags) = match args {
        [name, raw_id, flags @ ..] => (*name, *raw_id, flags),
        _ => return Err(usage_error(RECONCILE_USAGE)),
    };
    let transaction_id = parse_id(raw_id, "transaction")?;
    let (expense_ids, invoice_ids) = parse_targets(flags)?;
    context.open(name)?;
    let links = context
        .manager
        .reconcile_multi(transaction_id, &expense_ids, &invoice_ids)?;
    if links.is_empty() {
        output::success(format!("Cleared links for {transaction_id}."));
    } else {
        output::success(format!(
            "Reconciled {transaction_id} against {} item(s).",
            links.len()
        ));
    }
    Ok(())
}

fn cmd_unreconcile(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let [name, raw_id] = args else {
        return Err(usage_error("unreconcile <book> <transaction-id>"));
    };
    let transaction_id = parse_id(raw_id, "transaction")?;
    context.open(name)?;
    let removed = context.manager.unreconcile(transaction_id)?;
    output::success(format!(
        "Removed {removed} link(s); {transaction_id} is unreconciled."
    ));
    Ok(())
}

fn cmd_links(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let [name, raw_id] = args else {
        return Err(usage_error("links <book> <transaction-id>"));
    };
    let transaction_id = parse_id(raw_id, "transaction")?;
    context.open(name)?;
    let book = context.manager.book()?;
    let links = ReconciliationService::links(book, transaction_id)?;
    let summary = ReconciliationService::allocation(book, transaction_id)?;

    output::section(format!("Links for {transaction_id}"));
    for link in links {
        let label = match link.target {
            LinkTarget::Expense(id) => book.expense(id).map(Displayable::display_label),
            LinkTarget::Invoice(id) => book.document(id).map(Displayable::display_label),
        }
        .unwrap_or_else(|| link.target.to_string());
        output::info(format!(
            "  {:>12}  {}",
            context.money(link.amount_matched),
            label
        ));
    }
    output::info(format!(
        "  Matched {} of {}; unallocated {}",
        context.money(summary.matched_total),
        context.money(summary.transaction_amount.abs()),
        context.money(summary.unallocated)
    ));
    if summary.is_reconciled {
        output::success("  Reconciled");
    } else {
        output::warning("Not reconciled");
    }
    Ok(())
}

fn parse_targets(flags: &[&str]) -> Result<(Vec<Uuid>, Vec<Uuid>), CliError> {
    let mut expenses = Vec::new();
    let mut invoices = Vec::new();
    let mut iter = flags.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| CliError::Input(format!("`{flag}` needs an id")))?;
        match *flag {
            "--expense" | "-e" => expenses.push(parse_id(value, "expense")?),
            "--invoice" | "-i" => invoices.push(parse_id(value, "invoice")?),
            other => return Err(CliError::Input(format!("unknown option `{other}`"))),
        }
    }
    Ok((expenses, invoices))
}

fn confidence_label(confidence: MatchConfidence) -> String {
    let label = confidence.to_string();
    match confidence {
        MatchConfidence::High => label.bright_green().to_string(),
        MatchConfidence::Medium => label.bright_yellow().to_string(),
        MatchConfidence::Low => label.bright_red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_targets_splits_expenses_and_invoices() {
        let expense = Uuid::new_v4().to_string();
        let invoice = Uuid::new_v4().to_string();
        let (expenses, invoices) =
            parse_targets(&["--expense", expense.as_str(), "-i", invoice.as_str()]).unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(invoices.len(), 1);
    }

    #[test]
    fn parse_targets_rejects_dangling_flag() {
        assert!(parse_targets(&["--expense"]).is_err());
        assert!(parse_targets(&["--bogus", "x"]).is_err());
    }
}

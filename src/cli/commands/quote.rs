use std::fs;

use crate::cli::commands::{parse_id, usage_error, CommandDefinition, CommandResult};
use crate::cli::context::CliContext;
use crate::cli::output;
use crate::core::services::QuoteService;
use crate::domain::QuoteDocument;
use crate::errors::CliError;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "add-document",
            "Import a quote or invoice from a JSON file",
            "add-document <book> <file.json>",
            cmd_add_document,
        ),
        CommandDefinition::new(
            "totals",
            "Show the totals breakdown of a document",
            "totals <book> <document-id>",
            cmd_totals,
        ),
        CommandDefinition::new(
            "invoice",
            "Convert a quote into a draft invoice",
            "invoice <book> <document-id>",
            cmd_invoice,
        ),
        CommandDefinition::new(
            "mark-paid",
            "Mark an invoice paid and snapshot its total",
            "mark-paid <book> <document-id>",
            cmd_mark_paid,
        ),
    ]
}

fn cmd_add_document(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let [name, path] = args else {
        return Err(usage_error("add-document <book> <file.json>"));
    };
    let data = fs::read_to_string(path)
        .map_err(|err| CliError::Input(format!("cannot read `{path}`: {err}")))?;
    let document: QuoteDocument = serde_json::from_str(&data)
        .map_err(|err| CliError::Input(format!("`{path}` is not a valid document: {err}")))?;
    let options = context.config.calculation_options();
    context.open(name)?;
    let id = context.manager.apply_and_persist(|book| {
        let id = QuoteService::add(book, document)?;
        QuoteService::refresh_snapshot(book, id, &options)?;
        Ok(id)
    })?;
    output::success(format!("Added document {id}"));
    Ok(())
}

fn cmd_totals(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let [name, raw_id] = args else {
        return Err(usage_error("totals <book> <document-id>"));
    };
    let id = parse_id(raw_id, "document")?;
    let options = context.config.calculation_options();
    context.open(name)?;
    let book = context.manager.book()?;
    let document = QuoteService::get(book, id)?;
    let totals = QuoteService::totals(book, id, &options)?;
    let sections = QuoteService::breakdown(book, id, &options)?;

    output::section(format!(
        "{} {} for {}",
        document.document_type, document.reference, document.client_name
    ));
    for section in &sections {
        let marker = if section.overridden { " (fixed price)" } else { "" };
        output::info(format!(
            "  {:<24} {:>12}{}",
            section.title,
            context.money(section.price),
            marker
        ));
    }
    let rows = [
        ("Materials", totals.materials_total),
        ("Labour", totals.labour_total),
        ("Subtotal", totals.client_subtotal),
        ("Markup", totals.markup_amount),
        ("Discount", -totals.discount_amount),
        ("After discount", totals.after_discount),
        ("VAT", totals.tax_amount),
        ("CIS deduction", -totals.cis_amount),
    ];
    output::section("Totals");
    for (label, value) in rows {
        output::info(format!("  {:<24} {:>12}", label, context.money(value)));
    }
    output::success(format!(
        "  {:<24} {:>12}",
        "Grand total",
        context.money(totals.grand_total)
    ));
    if document.part_payment.enabled {
        output::info(format!(
            "  {:<24} {:>12}",
            "Part payment due",
            context.money(totals.part_payment_amount)
        ));
    }
    Ok(())
}

fn cmd_invoice(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let [name, raw_id] = args else {
        return Err(usage_error("invoice <book> <document-id>"));
    };
    let id = parse_id(raw_id, "document")?;
    context.open(name)?;
    context
        .manager
        .apply_and_persist(|book| QuoteService::convert_to_invoice(book, id))?;
    output::success(format!("Document {id} is now a draft invoice."));
    Ok(())
}

fn cmd_mark_paid(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let [name, raw_id] = args else {
        return Err(usage_error("mark-paid <book> <document-id>"));
    };
    let id = parse_id(raw_id, "document")?;
    let options = context.config.calculation_options();
    context.open(name)?;
    let total = context
        .manager
        .apply_and_persist(|book| QuoteService::mark_paid(book, id, &options))?;
    output::success(format!("Invoice {id} paid: {}", context.money(total)));
    Ok(())
}

use crate::cli::commands::{usage_error, CommandDefinition, CommandResult};
use crate::cli::context::CliContext;
use crate::cli::output;
use crate::storage::book_warnings;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("new", "Create an empty book", "new <book>", cmd_new),
        CommandDefinition::new("books", "List stored books", "books", cmd_books),
        CommandDefinition::new(
            "backup",
            "Snapshot a book with an optional note",
            "backup <book> [note]",
            cmd_backup,
        ),
        CommandDefinition::new(
            "check",
            "Report dangling links and back-references",
            "check <book>",
            cmd_check,
        ),
    ]
}

fn cmd_new(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let [name] = args else {
        return Err(usage_error("new <book>"));
    };
    context.manager.create(name)?;
    output::success(format!("Created book `{name}`."));
    Ok(())
}

fn cmd_books(context: &mut CliContext, _args: &[&str]) -> CommandResult {
    let books = context.manager.storage().list_books()?;
    if books.is_empty() {
        output::info("No books stored yet.");
    }
    for name in books {
        output::info(name);
    }
    Ok(())
}

fn cmd_backup(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let (name, note) = match args {
        [name] => (*name, None),
        [name, note @ ..] => (*name, Some(note.join(" "))),
        [] => return Err(usage_error("backup <book> [note]")),
    };
    context.open(name)?;
    let file_name = context.manager.backup(note.as_deref())?;
    output::success(format!("Backup written: {file_name}"));
    Ok(())
}

fn cmd_check(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let [name] = args else {
        return Err(usage_error("check <book>"));
    };
    let warnings = book_warnings(context.open(name)?);
    if warnings.is_empty() {
        output::success("No problems found.");
    }
    for warning in warnings {
        output::warning(warning);
    }
    Ok(())
}

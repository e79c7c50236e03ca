use crate::cli::commands::{CommandDefinition, CommandResult};
use crate::cli::context::CliContext;
use crate::cli::output;
use crate::domain::book::CURRENT_SCHEMA_VERSION;
use crate::errors::CliError;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("version", "Show build metadata", "version", cmd_version),
        CommandDefinition::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
    ]
}

fn cmd_version(_context: &mut CliContext, _args: &[&str]) -> CommandResult {
    output::section(format!("Tradebook Core {}", env!("CARGO_PKG_VERSION")));
    output::info(format!("  Schema ver   : v{}", CURRENT_SCHEMA_VERSION));
    Ok(())
}

fn cmd_help(context: &mut CliContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first().map(|name| name.to_lowercase()) {
        let entry = context
            .registry
            .get(&name)
            .ok_or_else(|| CliError::Input(format!("unknown command `{name}`")))?;
        output::section(format!("Help: {}", entry.name));
        output::info(format!("  Description: {}", entry.description));
        output::info(format!("  Usage: {}", entry.usage));
        return Ok(());
    }

    output::section("Available commands");
    for entry in context.registry.iter() {
        output::info(format!("  {:<16} {}", entry.name, entry.description));
    }
    output::info("Use `help <command>` for details.");
    Ok(())
}

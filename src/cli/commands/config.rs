use crate::cli::commands::{usage_error, CommandDefinition, CommandResult};
use crate::cli::context::CliContext;
use crate::cli::output;
use crate::config::CONFIG_KEYS;
use crate::errors::CliError;

const CONFIG_USAGE: &str = "config [show|set <key> <value>|backup [note]|backups|restore <name>]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "config",
        "View and change calculation and matching preferences",
        CONFIG_USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut CliContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["show"] => show(context),
        ["set", key, value @ ..] if !value.is_empty() => set(context, key, &value.join(" ")),
        ["backup", note @ ..] => {
            let note = (!note.is_empty()).then(|| note.join(" "));
            let name = context
                .config_manager
                .backup(&context.config, note.as_deref())?;
            output::success(format!("Configuration backup written: {name}"));
            Ok(())
        }
        ["backups"] => {
            let names = context.config_manager.list_backups()?;
            if names.is_empty() {
                output::info("No configuration backups yet.");
            }
            for name in names {
                output::info(format!("  {name}"));
            }
            Ok(())
        }
        ["restore", name] => {
            context.config = context.config_manager.restore(name)?;
            output::success(format!("Configuration restored from {name}."));
            Ok(())
        }
        _ => Err(usage_error(CONFIG_USAGE)),
    }
}

fn show(context: &CliContext) -> CommandResult {
    output::section("Configuration");
    for (key, value) in context.config.entries() {
        output::info(format!("  {key:<32} {value}"));
    }
    Ok(())
}

/// Snapshots the current settings, then saves the changed ones.
fn set(context: &mut CliContext, key: &str, value: &str) -> CommandResult {
    if !CONFIG_KEYS.contains(&key) {
        return Err(CliError::Input(format!(
            "unknown setting `{key}`; known settings: {}",
            CONFIG_KEYS.join(", ")
        )));
    }
    let mut updated = context.config.clone();
    updated.set(key, value)?;
    let backup = context
        .config_manager
        .backup(&context.config, Some(&format!("before {}", key.replace('_', " "))))?;
    context.config_manager.save(&updated)?;
    context.config = updated;
    tracing::info!(key, backup = %backup, "configuration changed");
    output::success(format!("{key} set to {value}"));
    Ok(())
}

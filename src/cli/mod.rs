pub mod commands;
pub mod context;
pub mod output;

use crate::errors::CliError;
use context::CliContext;

/// Runs one CLI command given the arguments after the program name.
pub fn run_cli(args: &[String]) -> Result<(), CliError> {
    let mut context = CliContext::from_app_dir()?;
    output::set_color_enabled(context.config.ui_color_enabled);
    dispatch(&mut context, args)
}

pub fn dispatch(context: &mut CliContext, args: &[String]) -> Result<(), CliError> {
    let argv: Vec<&str> = args.iter().map(String::as_str).collect();
    let (command, rest) = match argv.split_first() {
        Some((command, rest)) => (command.to_ascii_lowercase(), rest),
        None => ("help".to_string(), &[][..]),
    };
    let handler = context
        .registry
        .get(&command)
        .map(|definition| definition.handler)
        .ok_or_else(|| {
            CliError::Input(format!(
                "unknown command `{command}`; run `help` for the list"
            ))
        })?;
    tracing::debug!(command = %command, "dispatching CLI command");
    handler(context, rest)
}

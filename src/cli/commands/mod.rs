use std::collections::HashMap;

pub mod banking;
pub mod book;
pub mod config;
pub mod quote;
pub mod reconcile;
pub mod system;

use uuid::Uuid;

use crate::cli::context::CliContext;
use crate::errors::CliError;

pub type CommandResult = Result<(), CliError>;

pub type CommandHandler = fn(&mut CliContext, &[&str]) -> CommandResult;

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(system::definitions());
    commands.extend(book::definitions());
    commands.extend(config::definitions());
    commands.extend(banking::definitions());
    commands.extend(quote::definitions());
    commands.extend(reconcile::definitions());
    commands
}

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }
}

pub(crate) fn usage_error(usage: &str) -> CliError {
    CliError::Input(format!("usage: {usage}"))
}

pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, CliError> {
    Uuid::parse_str(raw).map_err(|_| CliError::Input(format!("`{raw}` is not a valid {what} id")))
}

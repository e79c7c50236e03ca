use std::path::PathBuf;

use crate::cli::commands::{all_definitions, CommandRegistry};
use crate::config::{Config, ConfigManager};
use crate::core::BookManager;
use crate::domain::Book;
use crate::errors::CliError;
use crate::storage::JsonBookStorage;
use crate::utils;

/// State shared by every command of one CLI invocation.
pub struct CliContext {
    pub manager: BookManager,
    pub config: Config,
    pub config_manager: ConfigManager,
    pub registry: CommandRegistry,
}

impl CliContext {
    pub fn new(manager: BookManager, config_manager: ConfigManager, config: Config) -> Self {
        Self {
            manager,
            config,
            config_manager,
            registry: CommandRegistry::new(all_definitions()),
        }
    }

    /// Context rooted at the application data directory (`TRADEBOOK_HOME` aware).
    pub fn from_app_dir() -> Result<Self, CliError> {
        Self::with_data_dir(utils::app_data_dir())
    }

    /// Reads the config under `data_dir`, then opens book storage at the
    /// roots it names.
    pub fn with_data_dir(data_dir: PathBuf) -> Result<Self, CliError> {
        let config_manager = ConfigManager::with_base_dir(data_dir.clone())?;
        let config = config_manager.load()?;
        let storage = JsonBookStorage::new(
            config.resolve_book_root(&data_dir),
            config.resolve_backup_root(&data_dir),
        )?;
        tracing::debug!(data_dir = %data_dir.display(), "CLI context opened");
        Ok(Self::new(
            BookManager::new(Box::new(storage)),
            config_manager,
            config,
        ))
    }

    /// Loads `name` as the current book.
    pub fn open(&mut self, name: &str) -> Result<&Book, CliError> {
        Ok(self.manager.load(name)?)
    }

    pub fn money(&self, amount: f64) -> String {
        crate::currency::format_amount(
            amount,
            &crate::currency::CurrencyCode::new(self.config.currency.clone()),
            &self.config.locale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn books_follow_configured_root() {
        let data = tempdir().unwrap();
        let shared = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(data.path().to_path_buf()).unwrap();
        let root = shared.path().join("books");
        manager
            .update(|config| config.set("book_root", &root.display().to_string()))
            .unwrap();

        let mut context = CliContext::with_data_dir(data.path().to_path_buf()).unwrap();
        context.manager.create("Workshop").unwrap();

        assert!(root.join("workshop.json").exists());
        assert!(!data.path().join("books").join("workshop.json").exists());
        assert!(data.path().join("backups").exists());
    }
}

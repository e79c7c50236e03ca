//! Persistent business preferences: calculation toggles, matcher tuning and
//! storage locations, plus the `config.json` manager with its backups.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{CalculationSettings, Config, MatchingSettings, CONFIG_KEYS};

use std::{
    cmp::Reverse,
    fs,
    path::{Path, PathBuf},
};

use chrono::Utc;

use super::{Config, ConfigError};
use crate::utils::{self, persistence};

const CONFIG_FILE: &str = "config.json";
const BACKUP_PREFIX: &str = "config_";
const BACKUP_EXTENSION: &str = ".json";

/// Loads, saves and snapshots the single `config.json` of a data directory.
///
/// Backups are named `config_<YYYYmmdd>_<HHMMSSmmm>[-n][_note].json`; `n`
/// separates backups taken within the same millisecond.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    /// Manager for `<base>/config/config.json`, creating the folders it needs.
    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let config_dir = base.join("config");
        let backups_dir = config_dir.join("backups");
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE),
            backups_dir,
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Stored configuration, or the defaults when nothing was saved yet.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }
        Ok(persistence::read_json(&self.config_path)?)
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        persistence::write_json_atomic(config, &self.config_path)?;
        tracing::debug!(path = %self.config_path.display(), "configuration saved");
        Ok(())
    }

    /// Applies `change` to the stored configuration and saves it. The file on
    /// disk is left alone when `change` fails.
    pub fn update<F>(&self, change: F) -> Result<Config, ConfigError>
    where
        F: FnOnce(&mut Config) -> Result<(), ConfigError>,
    {
        let mut config = self.load()?;
        change(&mut config)?;
        self.save(&config)?;
        Ok(config)
    }

    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<String, ConfigError> {
        let name = self.next_backup_name(note);
        persistence::write_json_atomic(config, &self.backups_dir.join(&name))?;
        tracing::info!(backup = %name, "configuration backed up");
        Ok(name)
    }

    /// Makes the named backup the active configuration.
    pub fn restore(&self, backup_name: &str) -> Result<Config, ConfigError> {
        let path = self.backups_dir.join(backup_name);
        if !is_backup_name(backup_name) || !path.is_file() {
            return Err(ConfigError::BackupNotFound(backup_name.to_string()));
        }
        let config: Config = persistence::read_json(&path)?;
        self.save(&config)?;
        tracing::info!(backup = %backup_name, "configuration restored");
        Ok(config)
    }

    /// Backup file names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>, ConfigError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            if let Some(name) = entry?.file_name().to_str() {
                if is_backup_name(name) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort_by_key(|name| Reverse(backup_sort_key(name)));
        Ok(names)
    }

    fn next_backup_name(&self, note: Option<&str>) -> String {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S%3f").to_string();
        let suffix = utils::sanitize_note(note)
            .map(|label| format!("_{label}"))
            .unwrap_or_default();
        let mut counter = 0u32;
        loop {
            let unique = if counter == 0 {
                stamp.clone()
            } else {
                format!("{stamp}-{counter}")
            };
            let name = format!("{BACKUP_PREFIX}{unique}{suffix}{BACKUP_EXTENSION}");
            if !self.backups_dir.join(&name).exists() {
                return name;
            }
            counter += 1;
        }
    }
}

const STAMP_LEN: usize = "YYYYmmdd_HHMMSSmmm".len();

/// Orders backups by timestamp, then by same-millisecond counter.
fn backup_sort_key(name: &str) -> (String, u32) {
    let rest = name.strip_prefix(BACKUP_PREFIX).unwrap_or(name);
    let stamp: String = rest.chars().take(STAMP_LEN).collect();
    let counter = rest
        .get(STAMP_LEN..)
        .and_then(|tail| tail.strip_prefix('-'))
        .map(|tail| {
            tail.chars()
                .take_while(char::is_ascii_digit)
                .collect::<String>()
        })
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0);
    (stamp, counter)
}

fn is_backup_name(name: &str) -> bool {
    name.starts_with(BACKUP_PREFIX)
        && name.ends_with(BACKUP_EXTENSION)
        && !name.contains(['/', '\\'])
}

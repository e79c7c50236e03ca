use std::io;

use thiserror::Error;

use crate::errors::BookError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(String),

    #[error("unknown setting `{0}`")]
    UnknownKey(String),

    #[error("`{value}` is not a valid value for `{key}`")]
    InvalidValue { key: String, value: String },

    #[error("configuration backup `{0}` not found")]
    BackupNotFound(String),

    #[error("{0}")]
    Storage(String),
}

impl From<BookError> for ConfigError {
    fn from(err: BookError) -> Self {
        ConfigError::Storage(err.to_string())
    }
}

//! Errors from locating, reading and writing `rawserial.toml`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// An explicit `--config` or `RAWSERIAL_CONFIG` path does not exist.
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match `[driver]`/`[logging]`.
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Failed to write configuration file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `RAWSERIAL_*` override holds a value the field cannot take, such as
    /// `RAWSERIAL_DRIVER_DEBUG=maybe`.
    #[error("Invalid value in environment variable '{var}': {message}")]
    EnvParseError { var: String, message: String },
}

impl ConfigFileError {
    pub fn env_parse(var: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EnvParseError {
            var: var.into(),
            message: message.into(),
        }
    }
}

pub type ConfigFileResult<T> = Result<T, ConfigFileError>;

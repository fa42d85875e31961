//! Configuration errors

use std::path::PathBuf;

use thiserror::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors. Missing credentials are not one of them: those
/// surface when the connection is attempted.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment value could not be parsed
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidEnv {
        key: String,
        value: String,
        reason: String,
    },

    /// Config file unreadable
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected shape
    #[error("Invalid config JSON: {0}")]
    Parse(String),

    /// Config parsed but a field is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

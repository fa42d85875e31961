//! Locator errors

use std::path::PathBuf;

use thiserror::Error;

/// Result type for locator operations
pub type LocatorResult<T> = Result<T, LocatorError>;

/// Errors resolving or writing inside a batch location
#[derive(Debug, Error)]
pub enum LocatorError {
    /// Dated container could not be created
    #[error("Failed to create batch location {}: {source}", .path.display())]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File inside the location could not be read or written
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest could not be encoded or decoded
    #[error("Manifest error: {0}")]
    Manifest(String),
}

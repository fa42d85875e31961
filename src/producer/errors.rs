//! Producer errors

use std::path::PathBuf;

use thiserror::Error;

use crate::batch::BatchError;
use crate::locator::LocatorError;

/// Result type for batch production
pub type ProducerResult<T> = Result<T, ProducerError>;

#[derive(Debug, Error)]
pub enum ProducerError {
    /// Weather archive file unreadable
    #[error("Failed to read weather archive {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Weather archive is not an Open-Meteo hourly document
    #[error("Invalid weather archive: {0}")]
    Parse(String),

    /// Sampling distribution rejected its parameters
    #[error("Invalid sampling distribution: {0}")]
    Distribution(#[from] rand_distr::NormalError),

    /// Target location could not be resolved
    #[error(transparent)]
    Locator(#[from] LocatorError),

    /// Wide batch could not be written
    #[error(transparent)]
    Write(#[from] BatchError),
}

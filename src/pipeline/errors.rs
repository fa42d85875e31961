//! Pipeline errors
//!
//! Only run-level failures appear here. Entity-level problems are recorded
//! in the shred report or the run summary and never abort a run.

use thiserror::Error;

use crate::batch::BatchError;
use crate::destination::DestinationError;
use crate::locator::LocatorError;

/// Result type for pipeline stages
pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Wide batch unreadable or an artifact could not be written
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// Batch location or manifest failure
    #[error(transparent)]
    Locator(#[from] LocatorError),

    /// Destination could not be bound to the namespace
    #[error("Destination unavailable for run: {0}")]
    Destination(#[from] DestinationError),
}

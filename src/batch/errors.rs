//! Batch codec errors

use std::path::PathBuf;

use thiserror::Error;

/// Result type for batch I/O
pub type BatchResult<T> = Result<T, BatchError>;

/// Errors reading or writing batch artifacts
#[derive(Debug, Error)]
pub enum BatchError {
    /// File does not exist
    #[error("Batch file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Malformed CSV content
    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Underlying I/O failure
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BatchError {
    pub(crate) fn csv(path: &std::path::Path, source: csv::Error) -> Self {
        BatchError::Csv {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        BatchError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

//! Destination errors

use thiserror::Error;

/// Result type for destination operations
pub type DestinationResult<T> = Result<T, DestinationError>;

/// Errors raised by a destination backend
#[derive(Debug, Error)]
pub enum DestinationError {
    /// Connection could not be established or was lost
    #[error("Destination unavailable: {0}")]
    Unavailable(String),

    /// The namespace does not exist or cannot be bound
    #[error("Namespace '{namespace}' cannot be selected: {reason}")]
    UnknownNamespace { namespace: String, reason: String },

    /// Introspection or insert attempted before a namespace was selected
    #[error("No namespace selected")]
    NoNamespace,

    /// A table, column or namespace name is not a safe identifier
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// Insert called with no columns or no rows
    #[error("Nothing to insert into {0}")]
    EmptyInsert(String),

    /// A row's width does not match the column list
    #[error("Row {row} has {actual} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Insert statement rejected; the transaction was rolled back
    #[error("Insert into {table} failed: {reason}")]
    InsertFailed { table: String, reason: String },

    /// Read query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

impl DestinationError {
    /// Connection-level failures abort a run; everything else is per-table.
    pub fn is_connection_level(&self) -> bool {
        matches!(
            self,
            DestinationError::Unavailable(_) | DestinationError::UnknownNamespace { .. }
        )
    }
}

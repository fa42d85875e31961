//! Relational destination
//!
//! The pipeline talks to storage only through [`Destination`]. A destination
//! holds one connection and a selected namespace; tables are resolved inside
//! that namespace.
//!
//! Backends:
//! - [`MySqlDestination`]: the production store
//! - [`SqliteDestination`]: local runs and tests (namespaces are attached
//!   databases)
//!
//! Dropping a destination releases its connection.

mod errors;
mod mysql_store;
pub mod sql;
mod sqlite_store;

pub use errors::{DestinationError, DestinationResult};
pub use mysql_store::MySqlDestination;
pub use sqlite_store::SqliteDestination;

use serde::Serialize;

use crate::schema::EntitySchema;

/// Rows read back from a table, every cell as text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FetchedRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl FetchedRows {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// A relational store the loader can introspect and write to.
pub trait Destination {
    /// Short backend name for logs
    fn backend(&self) -> &'static str;

    /// Binds the namespace all later calls resolve tables in.
    fn select_namespace(&mut self, namespace: &str) -> DestinationResult<()>;

    /// The namespace currently bound, if any
    fn namespace(&self) -> Option<&str>;

    /// Column names of `table` in declaration order. A table that does not
    /// exist has no columns.
    fn live_columns(&mut self, table: &str) -> DestinationResult<Vec<String>>;

    /// Inserts all rows or none. Returns the number of rows written.
    fn insert_rows(
        &mut self,
        table: &str,
        columns: &[String],
        rows: &[Vec<Option<String>>],
    ) -> DestinationResult<u64>;

    /// Reads at most `limit` rows of `table`.
    fn fetch_rows(&mut self, table: &str, limit: u32) -> DestinationResult<FetchedRows>;

    /// Creates the entity's table in the bound namespace unless it exists.
    fn create_table(&mut self, schema: &EntitySchema) -> DestinationResult<()>;
}

impl<D: Destination + ?Sized> Destination for &mut D {
    fn backend(&self) -> &'static str {
        (**self).backend()
    }

    fn select_namespace(&mut self, namespace: &str) -> DestinationResult<()> {
        (**self).select_namespace(namespace)
    }

    fn namespace(&self) -> Option<&str> {
        (**self).namespace()
    }

    fn live_columns(&mut self, table: &str) -> DestinationResult<Vec<String>> {
        (**self).live_columns(table)
    }

    fn insert_rows(
        &mut self,
        table: &str,
        columns: &[String],
        rows: &[Vec<Option<String>>],
    ) -> DestinationResult<u64> {
        (**self).insert_rows(table, columns, rows)
    }

    fn fetch_rows(&mut self, table: &str, limit: u32) -> DestinationResult<FetchedRows> {
        (**self).fetch_rows(table, limit)
    }

    fn create_table(&mut self, schema: &EntitySchema) -> DestinationResult<()> {
        (**self).create_table(schema)
    }
}

/// The bound namespace, or `NoNamespace`.
pub(crate) fn require_namespace(namespace: &Option<String>) -> DestinationResult<String> {
    namespace.clone().ok_or(DestinationError::NoNamespace)
}

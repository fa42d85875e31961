//! Read-only table viewer
//!
//! Bounded `SELECT *` per entity. A missing table, an empty table and a
//! failed query all come back as an empty view; only a bad row limit is an
//! error.

mod errors;
mod view;

pub use errors::{ViewerError, ViewerResult};
pub use view::{TableView, Viewer, DEFAULT_LIMIT, MAX_LIMIT};

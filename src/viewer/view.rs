use serde::Serialize;

use super::errors::{ViewerError, ViewerResult};
use crate::destination::{Destination, FetchedRows};
use crate::observability::{log_event_with_fields, Event};
use crate::pipeline::DEFAULT_NAMESPACE;
use crate::schema::SchemaRegistry;

/// Largest row limit a caller may ask for
pub const MAX_LIMIT: u32 = 1000;
/// Row limit when the caller gives none
pub const DEFAULT_LIMIT: u32 = 10;

/// Rows of one entity table, every cell as text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    pub entity: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl TableView {
    fn empty(entity: &str) -> Self {
        Self {
            entity: entity.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    fn from_fetched(entity: &str, fetched: FetchedRows) -> Self {
        Self {
            entity: entity.to_string(),
            columns: fetched.columns,
            rows: fetched.rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Reads entity tables through a borrowed destination.
pub struct Viewer<'d, D: Destination + ?Sized> {
    dest: &'d mut D,
    namespace: String,
}

impl<'d, D: Destination + ?Sized> Viewer<'d, D> {
    pub fn new(dest: &'d mut D) -> Self {
        Self {
            dest,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Up to `limit` rows of `entity`.
    pub fn fetch(&mut self, entity: &str, limit: u32) -> ViewerResult<TableView> {
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(ViewerError::InvalidLimit {
                got: limit,
                max: MAX_LIMIT,
            });
        }

        if self.dest.namespace() != Some(self.namespace.as_str()) {
            if let Err(e) = self.dest.select_namespace(&self.namespace) {
                self.warn(entity, &e.to_string());
                return Ok(TableView::empty(entity));
            }
        }

        match self.dest.fetch_rows(entity, limit) {
            Ok(fetched) => Ok(TableView::from_fetched(entity, fetched)),
            Err(e) => {
                self.warn(entity, &e.to_string());
                Ok(TableView::empty(entity))
            }
        }
    }

    /// One view per registered entity, in registry order.
    pub fn fetch_all(&mut self, registry: &SchemaRegistry, limit: u32) -> ViewerResult<Vec<TableView>> {
        registry
            .entity_names()
            .map(|entity| self.fetch(entity, limit))
            .collect()
    }

    fn warn(&self, entity: &str, error: &str) {
        log_event_with_fields(
            Event::ViewFetchFailed,
            &[("entity", entity), ("namespace", &self.namespace), ("error", error)],
        );
    }
}

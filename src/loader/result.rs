//! Per-entity load outcomes

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// How an entity's load ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    /// All rows committed
    Inserted,
    /// No artifact for the batch date
    SkippedNoFile,
    /// Artifact present but has no rows
    SkippedEmpty,
    /// None of the dataset's columns exist in the table
    SkippedNoMatchingColumns,
    /// Destination error; nothing committed for this entity
    Failed(String),
}

impl LoadOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadOutcome::Inserted => "INSERTED",
            LoadOutcome::SkippedNoFile => "SKIPPED_NO_FILE",
            LoadOutcome::SkippedEmpty => "SKIPPED_EMPTY",
            LoadOutcome::SkippedNoMatchingColumns => "SKIPPED_NO_MATCHING_COLUMNS",
            LoadOutcome::Failed(_) => "FAILED",
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            LoadOutcome::SkippedNoFile
                | LoadOutcome::SkippedEmpty
                | LoadOutcome::SkippedNoMatchingColumns
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, LoadOutcome::Failed(_))
    }
}

impl fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadOutcome::Failed(reason) => write!(f, "FAILED: {}", reason),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Report for one entity in one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadResult {
    pub entity_name: String,
    pub batch_date: NaiveDate,
    pub rows_inserted: u64,
    pub dropped_columns: BTreeSet<String>,
    pub outcome: LoadOutcome,
}

impl LoadResult {
    /// A result with no rows written
    pub fn skipped(entity: &str, batch_date: NaiveDate, outcome: LoadOutcome) -> Self {
        Self {
            entity_name: entity.to_string(),
            batch_date,
            rows_inserted: 0,
            dropped_columns: BTreeSet::new(),
            outcome,
        }
    }

    pub fn failed(entity: &str, batch_date: NaiveDate, reason: impl Into<String>) -> Self {
        Self::skipped(entity, batch_date, LoadOutcome::Failed(reason.into()))
    }

    pub fn inserted(entity: &str, batch_date: NaiveDate, rows: u64) -> Self {
        Self {
            rows_inserted: rows,
            ..Self::skipped(entity, batch_date, LoadOutcome::Inserted)
        }
    }

    /// Attaches the columns reconciliation dropped.
    pub fn with_dropped(mut self, dropped: BTreeSet<String>) -> Self {
        self.dropped_columns = dropped;
        self
    }
}

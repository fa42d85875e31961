//! Run summaries reported to the operator

use chrono::NaiveDate;
use serde::Serialize;

use crate::loader::{LoadOutcome, LoadResult};
use crate::locator::LocationManifest;

/// Outcome of the load stage for one batch date
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub batch_date: NaiveDate,
    pub namespace: String,
    pub inserted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub rows_inserted: u64,
    pub results: Vec<LoadResult>,
}

impl RunSummary {
    pub fn new(
        run_id: impl Into<String>,
        batch_date: NaiveDate,
        namespace: impl Into<String>,
        results: Vec<LoadResult>,
    ) -> Self {
        let inserted = results
            .iter()
            .filter(|r| r.outcome == LoadOutcome::Inserted)
            .count();
        let skipped = results.iter().filter(|r| r.outcome.is_skip()).count();
        let failed = results.iter().filter(|r| r.outcome.is_failure()).count();
        let rows_inserted = results.iter().map(|r| r.rows_inserted).sum();

        Self {
            run_id: run_id.into(),
            batch_date,
            namespace: namespace.into(),
            inserted,
            skipped,
            failed,
            rows_inserted,
            results,
        }
    }

    /// Result for one entity
    pub fn result(&self, entity: &str) -> Option<&LoadResult> {
        self.results.iter().find(|r| r.entity_name == entity)
    }

    /// No entity failed (skips are fine)
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Shred then load for one date
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub manifest: LocationManifest,
    pub load: RunSummary,
}

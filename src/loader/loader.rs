use crate::batch::{normalize_row, EntityDataset};
use crate::destination::Destination;
use crate::observability::{log_event_with_fields, Event};
use crate::reconcile::{reconcile, Reconciliation};

use super::result::{LoadOutcome, LoadResult};

/// Loads entity datasets into a destination whose namespace is already bound.
pub struct BatchLoader<'d, D: Destination + ?Sized> {
    dest: &'d mut D,
}

impl<'d, D: Destination + ?Sized> BatchLoader<'d, D> {
    pub fn new(dest: &'d mut D) -> Self {
        Self { dest }
    }

    /// Inserts an already reconciled dataset as one atomic batch.
    ///
    /// An empty dataset is `SkippedEmpty` and the destination is not called.
    pub fn load(&mut self, entity: &str, dataset: &EntityDataset) -> LoadResult {
        let batch_date = dataset.batch_date();

        if dataset.is_empty() {
            return skipped(entity, LoadResult::skipped(entity, batch_date, LoadOutcome::SkippedEmpty));
        }

        let rows: Vec<Vec<Option<String>>> =
            dataset.rows().iter().map(|row| normalize_row(row)).collect();

        match self.dest.insert_rows(entity, dataset.columns(), &rows) {
            Ok(count) => {
                let count_str = count.to_string();
                let columns = dataset.columns().len().to_string();
                log_event_with_fields(
                    Event::LoadInserted,
                    &[("entity", entity), ("rows", &count_str), ("columns", &columns)],
                );
                LoadResult::inserted(entity, batch_date, count)
            }
            Err(e) => {
                let reason = e.to_string();
                log_event_with_fields(Event::LoadFailed, &[("entity", entity), ("error", &reason)]);
                LoadResult::failed(entity, batch_date, reason)
            }
        }
    }

    /// Reconciles `dataset` against the live table, then loads it.
    pub fn reconcile_and_load(&mut self, entity: &str, dataset: &EntityDataset) -> LoadResult {
        let batch_date = dataset.batch_date();

        if dataset.is_empty() {
            return skipped(entity, LoadResult::skipped(entity, batch_date, LoadOutcome::SkippedEmpty));
        }

        match reconcile(&mut *self.dest, entity, dataset) {
            Ok(Reconciliation::Matched { dataset, dropped }) => {
                self.load(entity, &dataset).with_dropped(dropped)
            }
            Ok(Reconciliation::NoMatchingColumns { dropped }) => skipped(
                entity,
                LoadResult::skipped(entity, batch_date, LoadOutcome::SkippedNoMatchingColumns)
                    .with_dropped(dropped),
            ),
            Err(e) => {
                let reason = e.to_string();
                log_event_with_fields(Event::LoadFailed, &[("entity", entity), ("error", &reason)]);
                LoadResult::failed(entity, batch_date, reason)
            }
        }
    }
}

fn skipped(entity: &str, result: LoadResult) -> LoadResult {
    log_event_with_fields(
        Event::LoadSkipped,
        &[("entity", entity), ("reason", result.outcome.as_str())],
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Value;
    use crate::destination::{DestinationError, DestinationResult, FetchedRows, SqliteDestination};
    use crate::schema::EntitySchema;
    use chrono::NaiveDate;
    use rusqlite::Connection;

    /// Records calls and fails inserts on demand
    #[derive(Default)]
    struct Recording {
        inserts: usize,
        introspections: usize,
        fail_insert: bool,
    }

    impl Destination for Recording {
        fn backend(&self) -> &'static str {
            "recording"
        }
        fn select_namespace(&mut self, _namespace: &str) -> DestinationResult<()> {
            Ok(())
        }
        fn namespace(&self) -> Option<&str> {
            Some("Phase1")
        }
        fn live_columns(&mut self, _table: &str) -> DestinationResult<Vec<String>> {
            self.introspections += 1;
            Ok(vec!["operator_id".into(), "shift".into()])
        }
        fn insert_rows(
            &mut self,
            table: &str,
            _columns: &[String],
            rows: &[Vec<Option<String>>],
        ) -> DestinationResult<u64> {
            self.inserts += 1;
            if self.fail_insert {
                return Err(DestinationError::InsertFailed {
                    table: table.into(),
                    reason: "deadlock".into(),
                });
            }
            Ok(rows.len() as u64)
        }
        fn fetch_rows(&mut self, _table: &str, _limit: u32) -> DestinationResult<FetchedRows> {
            Ok(FetchedRows::default())
        }
        fn create_table(&mut self, _schema: &EntitySchema) -> DestinationResult<()> {
            Ok(())
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 13).unwrap()
    }

    fn human_ops(rows: Vec<Vec<Value>>) -> EntityDataset {
        EntityDataset::new(
            "HumanOps",
            date(),
            vec!["operator_id".into(), "shift".into(), "action".into()],
            rows,
        )
    }

    #[test]
    fn test_empty_dataset_never_reaches_destination() {
        let mut dest = Recording::default();
        let result = BatchLoader::new(&mut dest).reconcile_and_load("HumanOps", &human_ops(vec![]));

        assert_eq!(result.outcome, LoadOutcome::SkippedEmpty);
        assert_eq!(dest.introspections, 0);
        assert_eq!(dest.inserts, 0);
    }

    #[test]
    fn test_insert_failure_reported() {
        let mut dest = Recording {
            fail_insert: true,
            ..Default::default()
        };
        let dataset = human_ops(vec![vec!["OP-1".into(), "Day".into(), "Inspect".into()]]);
        let result = BatchLoader::new(&mut dest).reconcile_and_load("HumanOps", &dataset);

        assert!(result.outcome.is_failure());
        assert_eq!(result.rows_inserted, 0);
        assert!(result.outcome.to_string().contains("deadlock"));
    }

    #[test]
    fn test_dropped_columns_reported() {
        let mut dest = Recording::default();
        let dataset = human_ops(vec![
            vec!["OP-1".into(), "Day".into(), "Inspect".into()],
            vec!["OP-2".into(), "Night".into(), Value::Null],
        ]);
        let result = BatchLoader::new(&mut dest).reconcile_and_load("HumanOps", &dataset);

        assert_eq!(result.outcome, LoadOutcome::Inserted);
        assert_eq!(result.rows_inserted, 2);
        assert!(result.dropped_columns.contains("action"));
        assert_eq!(dest.inserts, 1);
    }

    #[test]
    fn test_values_normalized_on_insert() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "ATTACH DATABASE ':memory:' AS Phase1;
             CREATE TABLE Phase1.HumanOps (operator_id VARCHAR(255), shift VARCHAR(255), action VARCHAR(255));",
        )
        .unwrap();
        let mut dest = SqliteDestination::from_connection(conn);
        dest.select_namespace("Phase1").unwrap();

        let dataset = human_ops(vec![vec![Value::Number(17.0), "Day".into(), Value::Number(f64::NAN)]]);
        let result = BatchLoader::new(&mut dest).load("HumanOps", &dataset);
        assert_eq!(result.outcome, LoadOutcome::Inserted);

        let fetched = dest.fetch_rows("HumanOps", 10).unwrap();
        assert_eq!(
            fetched.rows[0],
            vec![Some("17".to_string()), Some("Day".to_string()), None]
        );
    }
}

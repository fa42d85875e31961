use std::collections::BTreeSet;

use crate::batch::EntityDataset;
use crate::destination::{Destination, DestinationResult};
use crate::observability::{log_event_with_fields, Event};

/// Result of matching a dataset against its live table
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// At least one column matched; `dataset` holds only those columns
    Matched {
        dataset: EntityDataset,
        dropped: BTreeSet<String>,
    },
    /// No dataset column exists in the table (or the table is absent)
    NoMatchingColumns { dropped: BTreeSet<String> },
}

impl Reconciliation {
    /// Columns present in the dataset but not in the table
    pub fn dropped(&self) -> &BTreeSet<String> {
        match self {
            Reconciliation::Matched { dropped, .. } => dropped,
            Reconciliation::NoMatchingColumns { dropped } => dropped,
        }
    }
}

/// Intersects the dataset's columns with the live columns of table `entity`
/// in the destination's bound namespace. Dataset column order is kept.
pub fn reconcile<D: Destination + ?Sized>(
    dest: &mut D,
    entity: &str,
    dataset: &EntityDataset,
) -> DestinationResult<Reconciliation> {
    let live: BTreeSet<String> = dest.live_columns(entity)?.into_iter().collect();

    let (kept, dropped): (BTreeSet<String>, BTreeSet<String>) = dataset
        .columns()
        .iter()
        .cloned()
        .partition(|column| live.contains(column));

    if !dropped.is_empty() {
        let list = dropped.iter().cloned().collect::<Vec<_>>().join(",");
        log_event_with_fields(
            Event::ReconcileDroppedColumns,
            &[("entity", entity), ("columns", &list)],
        );
    }

    if kept.is_empty() {
        return Ok(Reconciliation::NoMatchingColumns { dropped });
    }

    Ok(Reconciliation::Matched {
        dataset: dataset.restrict_to(&kept),
        dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Value;
    use crate::destination::SqliteDestination;
    use chrono::NaiveDate;
    use rusqlite::Connection;

    fn destination() -> SqliteDestination {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "ATTACH DATABASE ':memory:' AS Phase1;
             CREATE TABLE Phase1.ProcessMetrics (
                 timestamp VARCHAR(255),
                 tool_id VARCHAR(255),
                 wafer_id VARCHAR(255)
             );",
        )
        .unwrap();
        let mut dest = SqliteDestination::from_connection(conn);
        dest.select_namespace("Phase1").unwrap();
        dest
    }

    fn dataset(columns: &[&str]) -> EntityDataset {
        let row = columns.iter().map(|c| Value::from(*c)).collect();
        EntityDataset::new(
            "ProcessMetrics",
            NaiveDate::from_ymd_opt(2026, 10, 13).unwrap(),
            columns.iter().map(|c| c.to_string()).collect(),
            vec![row],
        )
    }

    #[test]
    fn test_extra_column_dropped() {
        let mut dest = destination();
        let result = reconcile(&mut dest, "ProcessMetrics", &dataset(&["wafer_id", "tool_id", "vibration"])).unwrap();

        match result {
            Reconciliation::Matched { dataset, dropped } => {
                assert_eq!(dataset.columns(), &["wafer_id".to_string(), "tool_id".to_string()]);
                assert_eq!(dropped.into_iter().collect::<Vec<_>>(), vec!["vibration".to_string()]);
            }
            other => panic!("expected match, got {:?}", other),
        }
    }

    #[test]
    fn test_table_missing_columns_is_fine() {
        let mut dest = destination();
        let result = reconcile(&mut dest, "ProcessMetrics", &dataset(&["wafer_id"])).unwrap();
        assert!(matches!(result, Reconciliation::Matched { ref dropped, .. } if dropped.is_empty()));
    }

    #[test]
    fn test_no_overlap() {
        let mut dest = destination();
        let result = reconcile(&mut dest, "ProcessMetrics", &dataset(&["vibration"])).unwrap();
        assert!(matches!(result, Reconciliation::NoMatchingColumns { .. }));
        assert_eq!(result.dropped().len(), 1);
    }

    #[test]
    fn test_absent_table_matches_nothing() {
        let mut dest = destination();
        let result = reconcile(&mut dest, "HumanOps", &dataset(&["wafer_id"])).unwrap();
        assert!(matches!(result, Reconciliation::NoMatchingColumns { .. }));
    }
}

//! Per-entity datasets
//!
//! After shredding, an entity's rows have a fixed column set. Rows are stored
//! column-aligned, in the order they appeared in the wide batch.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::value::Value;

/// The rows of one entity for one batch date
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDataset {
    entity: String,
    batch_date: NaiveDate,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl EntityDataset {
    /// Creates a dataset. Every row must have one value per column.
    pub fn new(
        entity: impl Into<String>,
        batch_date: NaiveDate,
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    ) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self {
            entity: entity.into(),
            batch_date,
            columns,
            rows,
        }
    }

    /// Entity name
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Batch date the rows belong to
    pub fn batch_date(&self) -> NaiveDate {
        self.batch_date
    }

    /// Columns in dataset order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Column set, for set arithmetic
    pub fn column_set(&self) -> BTreeSet<String> {
        self.columns.iter().cloned().collect()
    }

    /// Rows aligned with `columns`
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Value at (row, column name)
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Restricts the dataset to the given columns, keeping dataset column
    /// order. Columns the dataset does not carry are ignored.
    pub fn restrict_to(&self, keep: &BTreeSet<String>) -> EntityDataset {
        let indices: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| keep.contains(*c))
            .map(|(i, _)| i)
            .collect();

        let columns = indices.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        EntityDataset::new(self.entity.clone(), self.batch_date, columns, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 13).unwrap()
    }

    fn sample() -> EntityDataset {
        EntityDataset::new(
            "WaferLotTracking",
            date(),
            vec!["lot_id".into(), "wafer_count".into(), "anomaly".into()],
            vec![
                vec![Value::from("LOT_0001"), Value::Number(18.0), Value::from("none")],
                vec![Value::from("LOT_0002"), Value::Number(22.0), Value::from("delay")],
            ],
        )
    }

    #[test]
    fn test_accessors() {
        let ds = sample();
        assert_eq!(ds.entity(), "WaferLotTracking");
        assert_eq!(ds.batch_date(), date());
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.value(1, "anomaly"), Some(&Value::from("delay")));
        assert_eq!(ds.value(0, "missing"), None);
    }

    #[test]
    fn test_restrict_keeps_dataset_order() {
        let ds = sample();
        let keep: BTreeSet<String> = ["anomaly".to_string(), "lot_id".to_string()].into_iter().collect();
        let restricted = ds.restrict_to(&keep);

        assert_eq!(restricted.columns(), &["lot_id", "anomaly"]);
        assert_eq!(restricted.rows()[1], vec![Value::from("LOT_0002"), Value::from("delay")]);
        assert_eq!(restricted.row_count(), 2);
    }

    #[test]
    fn test_restrict_to_nothing() {
        let restricted = sample().restrict_to(&BTreeSet::new());
        assert!(restricted.columns().is_empty());
        assert_eq!(restricted.row_count(), 2);
    }
}

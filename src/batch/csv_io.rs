//! CSV codec for wide batches and entity artifacts
//!
//! Writes are deterministic: the header is the batch/dataset column order and
//! every cell goes through `normalize_value` (storage null → empty cell).
//! Writing over an existing file replaces it.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;

use super::dataset::EntityDataset;
use super::errors::{BatchError, BatchResult};
use super::normalize::normalize_value;
use super::record::{Record, WideBatch};
use super::value::Value;

/// Reads a wide batch. Column order is the header order.
pub fn read_wide_batch(path: &Path) -> BatchResult<WideBatch> {
    let (columns, raw_rows) = read_table(path)?;

    let rows = raw_rows
        .into_iter()
        .map(|cells| {
            let mut record = Record::new();
            for (column, cell) in columns.iter().zip(cells) {
                record.insert(column.clone(), Value::parse_cell(&cell));
            }
            record
        })
        .collect();

    Ok(WideBatch::new(columns, rows))
}

/// Writes a wide batch; fields a record lacks become empty cells.
pub fn write_wide_batch(path: &Path, batch: &WideBatch) -> BatchResult<()> {
    let rows = batch.rows().iter().map(|record| {
        batch
            .columns()
            .iter()
            .map(|c| normalize_value(record.get(c)).unwrap_or_default())
            .collect::<Vec<_>>()
    });
    write_table(path, batch.columns(), rows)
}

/// Reads an entity artifact back into a dataset.
pub fn read_dataset(path: &Path, entity: &str, batch_date: NaiveDate) -> BatchResult<EntityDataset> {
    let (columns, raw_rows) = read_table(path)?;

    let rows = raw_rows
        .into_iter()
        .map(|cells| cells.iter().map(|c| Value::parse_cell(c)).collect())
        .collect();

    Ok(EntityDataset::new(entity, batch_date, columns, rows))
}

/// Writes an entity artifact.
pub fn write_dataset(path: &Path, dataset: &EntityDataset) -> BatchResult<()> {
    let rows = dataset.rows().iter().map(|row| {
        row.iter()
            .map(|v| normalize_value(v).unwrap_or_default())
            .collect::<Vec<_>>()
    });
    write_table(path, dataset.columns(), rows)
}

fn read_table(path: &Path) -> BatchResult<(Vec<String>, Vec<Vec<String>>)> {
    if !path.exists() {
        return Err(BatchError::NotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| BatchError::csv(path, e))?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| BatchError::csv(path, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| BatchError::csv(path, e))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok((columns, rows))
}

fn write_table<I>(path: &Path, columns: &[String], rows: I) -> BatchResult<()>
where
    I: Iterator<Item = Vec<String>>,
{
    let mut buffer = Vec::new();
    {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(&mut buffer);

        writer
            .write_record(columns)
            .map_err(|e| BatchError::csv(path, e))?;
        for row in rows {
            writer
                .write_record(&row)
                .map_err(|e| BatchError::csv(path, e))?;
        }
        writer
            .flush()
            .map_err(|e| BatchError::io(path, e))?;
    }

    let mut file = File::create(path).map_err(|e| BatchError::io(path, e))?;
    file.write_all(&buffer).map_err(|e| BatchError::io(path, e))?;
    file.sync_all().map_err(|e| BatchError::io(path, e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 13).unwrap()
    }

    #[test]
    fn test_read_wide_batch_parses_cells() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("phase1.csv");
        fs::write(
            &path,
            "timestamp,aqi,lot_id\n2026-10-13T00:00,42,\n,,LOT_0001\n",
        )
        .unwrap();

        let batch = read_wide_batch(&path).unwrap();
        assert_eq!(batch.columns(), &["timestamp", "aqi", "lot_id"]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.rows()[0].get("aqi"), &Value::Number(42.0));
        assert!(batch.rows()[0].is_null("lot_id"));
        assert_eq!(batch.rows()[1].get("lot_id"), &Value::from("LOT_0001"));
    }

    #[test]
    fn test_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = read_wide_batch(&tmp.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, BatchError::NotFound(_)));
    }

    #[test]
    fn test_ragged_row_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.csv");
        fs::write(&path, "a,b\n1,2,3\n").unwrap();
        assert!(matches!(read_wide_batch(&path), Err(BatchError::Csv { .. })));
    }

    #[test]
    fn test_write_dataset_renders_normalized_cells() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("HumanOps.csv");
        let ds = EntityDataset::new(
            "HumanOps",
            date(),
            vec!["log_id".into(), "error_flag".into(), "shift".into()],
            vec![vec![Value::from("LOG_1"), Value::from(false), Value::Null]],
        );

        write_dataset(&path, &ds).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "log_id,error_flag,shift\nLOG_1,False,\n");
    }

    #[test]
    fn test_empty_dataset_keeps_header() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Lots.csv");
        let ds = EntityDataset::new("Lots", date(), vec!["lot_id".into()], Vec::new());

        write_dataset(&path, &ds).unwrap();
        let back = read_dataset(&path, "Lots", date()).unwrap();
        assert_eq!(back.columns(), &["lot_id"]);
        assert!(back.is_empty());
    }

    #[test]
    fn test_rewrite_is_byte_identical() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Lots.csv");
        let ds = EntityDataset::new(
            "Lots",
            date(),
            vec!["lot_id".into(), "avg_process_time_hr".into()],
            vec![vec![Value::from("LOT_0003"), Value::Number(0.71)]],
        );

        write_dataset(&path, &ds).unwrap();
        let first = fs::read(&path).unwrap();
        write_dataset(&path, &ds).unwrap();
        let second = fs::read(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_wide_batch_write_then_read() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("wide.csv");
        let batch = WideBatch::from_records(vec![
            Record::new().with("station_id", "CHANDLER_AZ_01").with("aqi", 131_i64),
            Record::new().with("lot_id", "LOT_0009"),
        ]);

        write_wide_batch(&path, &batch).unwrap();
        let back = read_wide_batch(&path).unwrap();
        assert_eq!(back.columns(), batch.columns());
        assert_eq!(back.rows()[0].get("aqi"), &Value::Number(131.0));
        assert!(back.rows()[1].is_null("station_id"));
    }
}

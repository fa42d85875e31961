//! End-to-end Pipeline Tests
//!
//! produce → shred → provision → load over a temporary data directory and
//! an attached SQLite namespace, plus scripted destinations for the failure
//! paths.
//!
//! - A missing artifact is a skip and the run continues
//! - One entity's insert failure does not stop the others
//! - A namespace that cannot be bound aborts the run
//! - Re-shredding a date never leaves a stale artifact behind

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use fabload::destination::{
    Destination, DestinationError, DestinationResult, FetchedRows, SqliteDestination,
};
use fabload::loader::LoadOutcome;
use fabload::locator::BatchLocator;
use fabload::pipeline::{Pipeline, PipelineError};
use fabload::producer::{produce, DEFAULT_SEED};
use fabload::schema::{EntitySchema, SchemaRegistry, PHASE1_ENTITIES};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn batch_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 13).unwrap()
}

/// A full day of hourly archive data
fn write_weather(dir: &Path) -> PathBuf {
    let hours: Vec<String> = (0..24).map(|h| format!("2026-10-13T{:02}:00", h)).collect();
    let series = |base: f64| -> Vec<f64> { (0..24).map(|h| base + h as f64 * 0.1).collect() };
    let doc = json!({
        "latitude": 33.3062,
        "longitude": -111.8413,
        "hourly": {
            "time": hours,
            "temperature_2m": series(21.0),
            "relative_humidity_2m": series(18.0),
            "wind_speed_10m": series(2.0),
            "wind_direction_10m": series(140.0),
            "precipitation": series(0.0),
            "pressure_msl": series(1011.0),
        }
    });
    let path = dir.join("weather.json");
    std::fs::write(&path, doc.to_string()).unwrap();
    path
}

fn sqlite_phase1(dir: &Path) -> SqliteDestination {
    SqliteDestination::open(&dir.join("phase1.db"), "Phase1").unwrap()
}

/// Always binds, always reports every registry column, fails inserts into
/// the named tables.
struct Scripted {
    registry: SchemaRegistry,
    fail_tables: Vec<&'static str>,
    fail_bind: bool,
    inserted: Vec<String>,
}

impl Scripted {
    fn new() -> Self {
        Self {
            registry: SchemaRegistry::phase1(),
            fail_tables: Vec::new(),
            fail_bind: false,
            inserted: Vec::new(),
        }
    }
}

impl Destination for Scripted {
    fn backend(&self) -> &'static str {
        "scripted"
    }

    fn select_namespace(&mut self, namespace: &str) -> DestinationResult<()> {
        if self.fail_bind {
            return Err(DestinationError::Unavailable(format!(
                "connection refused binding {}",
                namespace
            )));
        }
        Ok(())
    }

    fn namespace(&self) -> Option<&str> {
        Some("Phase1")
    }

    fn live_columns(&mut self, table: &str) -> DestinationResult<Vec<String>> {
        Ok(self
            .registry
            .get(table)
            .map(|s| s.all_fields().into_iter().collect())
            .unwrap_or_default())
    }

    fn insert_rows(
        &mut self,
        table: &str,
        _columns: &[String],
        rows: &[Vec<Option<String>>],
    ) -> DestinationResult<u64> {
        if self.fail_tables.contains(&table) {
            return Err(DestinationError::InsertFailed {
                table: table.to_string(),
                reason: "Lock wait timeout exceeded".to_string(),
            });
        }
        self.inserted.push(table.to_string());
        Ok(rows.len() as u64)
    }

    fn fetch_rows(&mut self, _table: &str, _limit: u32) -> DestinationResult<FetchedRows> {
        Ok(FetchedRows::default())
    }

    fn create_table(&mut self, _schema: &EntitySchema) -> DestinationResult<()> {
        Ok(())
    }
}

/// Produces the day's batch (with weather) and shreds it.
fn produced_and_shredded(tmp: &TempDir, registry: &SchemaRegistry) -> BatchLocator {
    let locator = BatchLocator::new(tmp.path().join("csvs"));
    let weather = write_weather(tmp.path());
    produce(&locator, batch_date(), DEFAULT_SEED, Some(&weather)).unwrap();
    Pipeline::new(&locator, registry).shred_stage(batch_date()).unwrap();
    locator
}

// =============================================================================
// Full Run
// =============================================================================

/// Every entity extracted and loaded on a provisioned namespace.
#[test]
fn test_full_run_loads_all_entities() {
    let tmp = TempDir::new().unwrap();
    let registry = SchemaRegistry::phase1();
    let locator = BatchLocator::new(tmp.path().join("csvs"));
    let weather = write_weather(tmp.path());
    produce(&locator, batch_date(), DEFAULT_SEED, Some(&weather)).unwrap();

    let mut dest = sqlite_phase1(tmp.path());
    let pipeline = Pipeline::new(&locator, &registry);
    pipeline.provision(&mut dest).unwrap();
    let report = pipeline.run(&mut dest, batch_date()).unwrap();

    assert_eq!(report.manifest.artifacts.len(), 5);
    assert_eq!(report.load.inserted, 5);
    assert!(report.load.is_clean());
    assert_eq!(report.load.result("Meteorology").unwrap().rows_inserted, 24);
    assert_eq!(report.load.result("WaferLotTracking").unwrap().rows_inserted, 20);

    let order: Vec<&str> = report
        .load
        .results
        .iter()
        .map(|r| r.entity_name.as_str())
        .collect();
    assert_eq!(order, PHASE1_ENTITIES);
}

/// No WaferLotTracking artifact: four loads and one skip.
#[test]
fn test_missing_artifact_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let registry = SchemaRegistry::phase1();
    let locator = produced_and_shredded(&tmp, &registry);

    let location = locator.find(batch_date()).unwrap();
    std::fs::remove_file(location.artifact_path("WaferLotTracking")).unwrap();

    let mut dest = sqlite_phase1(tmp.path());
    let pipeline = Pipeline::new(&locator, &registry);
    pipeline.provision(&mut dest).unwrap();
    let summary = pipeline.load_stage(&mut dest, batch_date()).unwrap();

    assert_eq!(summary.inserted, 4);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(
        summary.result("WaferLotTracking").unwrap().outcome,
        LoadOutcome::SkippedNoFile
    );
}

// =============================================================================
// Failure Paths
// =============================================================================

/// One table rejecting its insert leaves the rest loaded.
#[test]
fn test_entity_failure_does_not_block_others() {
    let tmp = TempDir::new().unwrap();
    let registry = SchemaRegistry::phase1();
    let locator = produced_and_shredded(&tmp, &registry);

    let mut dest = Scripted::new();
    dest.fail_tables = vec!["ProcessMetrics"];

    let summary = Pipeline::new(&locator, &registry)
        .load_stage(&mut dest, batch_date())
        .unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.inserted, 4);
    let failed = summary.result("ProcessMetrics").unwrap();
    assert!(failed.outcome.to_string().contains("Lock wait timeout"));
    assert_eq!(failed.rows_inserted, 0);
    assert_eq!(
        dest.inserted,
        ["Meteorology", "FacilityLogs", "HumanOps", "WaferLotTracking"]
    );
}

/// A destination that cannot bind the namespace aborts the run.
#[test]
fn test_unbindable_namespace_aborts_run() {
    let tmp = TempDir::new().unwrap();
    let registry = SchemaRegistry::phase1();
    let locator = produced_and_shredded(&tmp, &registry);

    let mut dest = Scripted::new();
    dest.fail_bind = true;

    let err = Pipeline::new(&locator, &registry)
        .run(&mut dest, batch_date())
        .unwrap_err();
    match err {
        PipelineError::Destination(inner) => assert!(inner.is_connection_level()),
        other => panic!("expected destination error, got {:?}", other),
    }
    assert!(dest.inserted.is_empty());
}

/// An unattached namespace on a real backend aborts too.
#[test]
fn test_unknown_namespace_on_sqlite() {
    let tmp = TempDir::new().unwrap();
    let registry = SchemaRegistry::phase1();
    let locator = produced_and_shredded(&tmp, &registry);

    let mut dest = sqlite_phase1(tmp.path());
    let err = Pipeline::new(&locator, &registry)
        .with_namespace("Phase2")
        .load_stage(&mut dest, batch_date())
        .unwrap_err();
    assert!(matches!(err, PipelineError::Destination(_)));
}

// =============================================================================
// Re-runs
// =============================================================================

/// Re-producing a date without weather removes the old Meteorology artifact.
#[test]
fn test_reshred_removes_stale_artifact() {
    let tmp = TempDir::new().unwrap();
    let registry = SchemaRegistry::phase1();
    let locator = produced_and_shredded(&tmp, &registry);
    let location = locator.locate(batch_date()).unwrap();
    assert!(location.artifact_path("Meteorology").is_file());

    produce(&locator, batch_date(), DEFAULT_SEED, None).unwrap();
    let stage = Pipeline::new(&locator, &registry)
        .shred_stage(batch_date())
        .unwrap();

    assert!(!location.artifact_path("Meteorology").exists());
    assert!(stage.manifest.skipped.contains_key("Meteorology"));
    assert_eq!(stage.manifest.artifacts.len(), 4);
}

/// The same seed produces the same artifacts on every run.
#[test]
fn test_reshred_is_byte_identical() {
    let tmp = TempDir::new().unwrap();
    let registry = SchemaRegistry::phase1();
    let locator = produced_and_shredded(&tmp, &registry);
    let first = Pipeline::new(&locator, &registry)
        .shred_stage(batch_date())
        .unwrap()
        .manifest;

    let again = produced_and_shredded(&tmp, &registry);
    let second = Pipeline::new(&again, &registry)
        .shred_stage(batch_date())
        .unwrap()
        .manifest;

    assert_eq!(first, second);
}

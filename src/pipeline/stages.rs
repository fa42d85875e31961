//! Shred and load stages
//!
//! Entities are processed one at a time in registry order. The destination is
//! borrowed for the whole load stage; whoever created it releases it.

use chrono::NaiveDate;
use uuid::Uuid;

use super::errors::{PipelineError, PipelineResult};
use super::summary::{RunReport, RunSummary};
use crate::batch::{read_dataset, read_wide_batch, write_dataset};
use crate::destination::sql::SURROGATE_KEY;
use crate::destination::Destination;
use crate::loader::{BatchLoader, LoadOutcome, LoadResult};
use crate::locator::{
    artifact_file_name, compute_file_checksum, format_checksum, ArtifactEntry, BatchLocation,
    BatchLocator, LocationManifest,
};
use crate::observability::{log_event_with_fields, Event, ObservationScope};
use crate::schema::SchemaRegistry;
use crate::shred::{ShredOutcome, ShredReport, Shredder};

/// Namespace the entity tables live in unless configured otherwise
pub const DEFAULT_NAMESPACE: &str = "Phase1";

/// What the shred stage left on disk
#[derive(Debug, Clone)]
pub struct ShredStage {
    pub location: BatchLocation,
    pub report: ShredReport,
    pub manifest: LocationManifest,
}

/// One pipeline run: a locator, a registry, a namespace and a run id shared by
/// every log line.
pub struct Pipeline<'a> {
    locator: &'a BatchLocator,
    registry: &'a SchemaRegistry,
    namespace: String,
    run_id: String,
}

impl<'a> Pipeline<'a> {
    pub fn new(locator: &'a BatchLocator, registry: &'a SchemaRegistry) -> Self {
        Self {
            locator,
            registry,
            namespace: DEFAULT_NAMESPACE.to_string(),
            run_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Reads the wide batch for `batch_date`, shreds it, and writes one
    /// artifact per extracted entity plus the location manifest.
    pub fn shred_stage(&self, batch_date: NaiveDate) -> PipelineResult<ShredStage> {
        let label = batch_date.format("%Y-%m-%d").to_string();
        let scope = ObservationScope::with_fields(
            "SHRED",
            &[("run_id", &self.run_id), ("batch_date", &label)],
        );

        match self.shred_into_location(batch_date) {
            Ok(stage) => {
                let extracted = stage.manifest.artifacts.len().to_string();
                let skipped = stage.manifest.skipped.len().to_string();
                scope.complete_with_fields(&[("extracted", &extracted), ("skipped", &skipped)]);
                Ok(stage)
            }
            Err(e) => {
                scope.fail(&e.to_string());
                Err(e)
            }
        }
    }

    fn shred_into_location(&self, batch_date: NaiveDate) -> PipelineResult<ShredStage> {
        let location = self.locator.locate(batch_date)?;
        let dir = location.dir().display().to_string();
        log_event_with_fields(Event::BatchLocated, &[("dir", &dir)]);

        let batch = read_wide_batch(&location.wide_batch_path())?;
        let report = Shredder::new(self.registry).shred(&batch, batch_date);
        let mut manifest = LocationManifest::new(location.date_label());

        for entry in report.entries() {
            let entity = entry.entity.as_str();
            match &entry.outcome {
                ShredOutcome::Extracted(dataset) => {
                    let path = location.artifact_path(entity);
                    write_dataset(&path, dataset)?;
                    let checksum = format_checksum(compute_file_checksum(&path)?);

                    let rows = dataset.row_count().to_string();
                    log_event_with_fields(
                        Event::ShredExtracted,
                        &[("entity", entity), ("rows", &rows)],
                    );
                    log_event_with_fields(
                        Event::ArtifactWritten,
                        &[("entity", entity), ("checksum", &checksum)],
                    );

                    manifest.add_artifact(
                        entity,
                        ArtifactEntry {
                            file: artifact_file_name(entity),
                            rows: dataset.row_count(),
                            columns: dataset.columns().to_vec(),
                            checksum,
                        },
                    );
                }
                ShredOutcome::SchemaMismatch(err) => {
                    let missing: Vec<String> = err.missing_fields().iter().cloned().collect();
                    let stale = location.remove_artifact(entity)?;
                    log_event_with_fields(
                        Event::ShredSchemaMismatch,
                        &[
                            ("entity", entity),
                            ("missing", &missing.join(",")),
                            ("stale_artifact_removed", if stale { "true" } else { "false" }),
                        ],
                    );
                    manifest.add_skipped(entity, missing);
                }
            }
        }

        let manifest_path = location.manifest_path();
        manifest.write_to_file(&manifest_path)?;
        let manifest_label = manifest_path.display().to_string();
        log_event_with_fields(Event::ManifestWritten, &[("path", &manifest_label)]);

        Ok(ShredStage {
            location,
            report,
            manifest,
        })
    }

    /// Loads every registered entity's artifact for `batch_date`.
    ///
    /// Failing to bind the namespace aborts the stage. Every other problem is
    /// recorded against its entity and the next entity proceeds.
    pub fn load_stage<D: Destination + ?Sized>(
        &self,
        dest: &mut D,
        batch_date: NaiveDate,
    ) -> PipelineResult<RunSummary> {
        let label = batch_date.format("%Y-%m-%d").to_string();
        let scope = ObservationScope::with_fields(
            "LOAD",
            &[
                ("run_id", &self.run_id),
                ("batch_date", &label),
                ("backend", dest.backend()),
            ],
        );

        if let Err(e) = dest.select_namespace(&self.namespace) {
            log_event_with_fields(
                Event::DestinationUnavailable,
                &[("namespace", &self.namespace), ("error", &e.to_string())],
            );
            scope.fail(&e.to_string());
            return Err(PipelineError::Destination(e));
        }

        let location = self.locator.find(batch_date);
        let mut loader = BatchLoader::new(dest);
        let mut results = Vec::with_capacity(self.registry.len());

        for schema in self.registry.entities() {
            let entity = schema.entity_name.as_str();
            let artifact = location
                .as_ref()
                .map(|loc| self.locator.path_for(loc, entity))
                .filter(|path| path.is_file());

            let result = match artifact {
                None => {
                    log_event_with_fields(
                        Event::LoadSkipped,
                        &[("entity", entity), ("reason", LoadOutcome::SkippedNoFile.as_str())],
                    );
                    LoadResult::skipped(entity, batch_date, LoadOutcome::SkippedNoFile)
                }
                Some(path) => match read_dataset(&path, entity, batch_date) {
                    Ok(dataset) => loader.reconcile_and_load(entity, &dataset),
                    Err(e) => {
                        let reason = e.to_string();
                        log_event_with_fields(
                            Event::LoadFailed,
                            &[("entity", entity), ("error", &reason)],
                        );
                        LoadResult::failed(entity, batch_date, reason)
                    }
                },
            };
            results.push(result);
        }

        let summary = RunSummary::new(self.run_id.clone(), batch_date, self.namespace.clone(), results);

        let inserted = summary.inserted.to_string();
        let skipped = summary.skipped.to_string();
        let failed = summary.failed.to_string();
        let rows = summary.rows_inserted.to_string();
        scope.complete_with_fields(&[
            ("inserted", &inserted),
            ("skipped", &skipped),
            ("failed", &failed),
            ("rows", &rows),
        ]);

        Ok(summary)
    }

    /// Creates every registered entity's table in the namespace. Tables that
    /// already exist are left as they are.
    pub fn provision<D: Destination + ?Sized>(&self, dest: &mut D) -> PipelineResult<Vec<String>> {
        let scope = ObservationScope::with_fields(
            "PROVISION",
            &[("namespace", &self.namespace), ("backend", dest.backend())],
        );

        if let Err(e) = dest.select_namespace(&self.namespace) {
            scope.fail(&e.to_string());
            return Err(PipelineError::Destination(e));
        }

        let mut created = Vec::with_capacity(self.registry.len());
        for schema in self.registry.entities() {
            if let Err(e) = dest.create_table(schema) {
                scope.fail(&e.to_string());
                return Err(PipelineError::Destination(e));
            }
            let key = schema.key_field.as_deref().unwrap_or(SURROGATE_KEY);
            log_event_with_fields(
                Event::TableProvisioned,
                &[("entity", &schema.entity_name), ("key", key)],
            );
            created.push(schema.entity_name.clone());
        }

        let count = created.len().to_string();
        scope.complete_with_fields(&[("tables", &count)]);
        Ok(created)
    }

    /// Shred then load for the same date.
    pub fn run<D: Destination + ?Sized>(
        &self,
        dest: &mut D,
        batch_date: NaiveDate,
    ) -> PipelineResult<RunReport> {
        let label = batch_date.format("%Y-%m-%d").to_string();
        log_event_with_fields(
            Event::RunStart,
            &[("run_id", &self.run_id), ("batch_date", &label), ("namespace", &self.namespace)],
        );

        let outcome = self
            .shred_stage(batch_date)
            .and_then(|shred| {
                self.load_stage(dest, batch_date).map(|load| RunReport {
                    manifest: shred.manifest,
                    load,
                })
            });

        match &outcome {
            Ok(report) => {
                let inserted = report.load.inserted.to_string();
                let skipped = report.load.skipped.to_string();
                let failed = report.load.failed.to_string();
                log_event_with_fields(
                    Event::RunComplete,
                    &[
                        ("run_id", &self.run_id),
                        ("inserted", &inserted),
                        ("skipped", &skipped),
                        ("failed", &failed),
                    ],
                );
            }
            Err(e) => {
                log_event_with_fields(
                    Event::RunAborted,
                    &[("run_id", &self.run_id), ("error", &e.to_string())],
                );
            }
        }

        outcome
    }
}

/// Shreds the wide batch for `batch_date` with a fresh run id.
pub fn shred_stage(
    locator: &BatchLocator,
    registry: &SchemaRegistry,
    batch_date: NaiveDate,
) -> PipelineResult<ShredStage> {
    Pipeline::new(locator, registry).shred_stage(batch_date)
}

/// Loads the artifacts for `batch_date` into the default namespace.
pub fn load_stage<D: Destination + ?Sized>(
    locator: &BatchLocator,
    registry: &SchemaRegistry,
    dest: &mut D,
    batch_date: NaiveDate,
) -> PipelineResult<RunSummary> {
    Pipeline::new(locator, registry).load_stage(dest, batch_date)
}

/// Shred then load into the default namespace.
pub fn run<D: Destination + ?Sized>(
    locator: &BatchLocator,
    registry: &SchemaRegistry,
    dest: &mut D,
    batch_date: NaiveDate,
) -> PipelineResult<RunReport> {
    Pipeline::new(locator, registry).run(dest, batch_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{write_wide_batch, Record, WideBatch};
    use crate::destination::SqliteDestination;
    use rusqlite::Connection;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 13).unwrap()
    }

    fn human_ops_batch() -> WideBatch {
        WideBatch::from_records(vec![
            Record::new()
                .with("log_id", "L1")
                .with("operator_id", "OP-1")
                .with("timestamp", "2026-10-13 00:00:00")
                .with("action_type", "Inspect")
                .with("error_flag", 0i64)
                .with("shift", "Night"),
            Record::new()
                .with("log_id", "L2")
                .with("operator_id", "")
                .with("timestamp", "2026-10-13 00:15:00")
                .with("action_type", "Load")
                .with("error_flag", 1i64)
                .with("shift", "Night"),
        ])
    }

    #[test]
    fn test_shred_stage_writes_artifacts_and_manifest() {
        let tmp = TempDir::new().unwrap();
        let locator = BatchLocator::new(tmp.path());
        let registry = SchemaRegistry::phase1();
        let location = locator.locate(date()).unwrap();
        write_wide_batch(&location.wide_batch_path(), &human_ops_batch()).unwrap();

        let stage = shred_stage(&locator, &registry, date()).unwrap();

        assert_eq!(stage.manifest.artifacts["HumanOps"].rows, 1);
        assert!(stage.manifest.skipped.contains_key("Meteorology"));
        assert!(location.artifact_path("HumanOps").is_file());
        assert!(!location.artifact_path("Meteorology").exists());

        let on_disk = LocationManifest::read_from_file(&location.manifest_path()).unwrap();
        assert_eq!(on_disk, stage.manifest);
    }

    #[test]
    fn test_shred_stage_without_wide_batch() {
        let tmp = TempDir::new().unwrap();
        let locator = BatchLocator::new(tmp.path());
        let err = shred_stage(&locator, &SchemaRegistry::phase1(), date()).unwrap_err();
        assert!(matches!(err, PipelineError::Batch(_)));
    }

    #[test]
    fn test_load_stage_unknown_namespace_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let locator = BatchLocator::new(tmp.path());
        let mut dest = SqliteDestination::from_connection(Connection::open_in_memory().unwrap());

        let err = load_stage(&locator, &SchemaRegistry::phase1(), &mut dest, date()).unwrap_err();
        assert!(matches!(err, PipelineError::Destination(_)));
    }

    #[test]
    fn test_load_stage_without_location_skips_everything() {
        let tmp = TempDir::new().unwrap();
        let locator = BatchLocator::new(tmp.path());
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("ATTACH DATABASE ':memory:' AS Phase1").unwrap();
        let mut dest = SqliteDestination::from_connection(conn);

        let summary = load_stage(&locator, &SchemaRegistry::phase1(), &mut dest, date()).unwrap();
        assert_eq!(summary.skipped, 5);
        assert!(summary
            .results
            .iter()
            .all(|r| r.outcome == LoadOutcome::SkippedNoFile));
    }

    #[test]
    fn test_provision_then_load() {
        let tmp = TempDir::new().unwrap();
        let locator = BatchLocator::new(tmp.path());
        let registry = SchemaRegistry::phase1();
        let location = locator.locate(date()).unwrap();
        write_wide_batch(&location.wide_batch_path(), &human_ops_batch()).unwrap();

        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("ATTACH DATABASE ':memory:' AS Phase1").unwrap();
        let mut dest = SqliteDestination::from_connection(conn);

        let pipeline = Pipeline::new(&locator, &registry);
        let tables = pipeline.provision(&mut dest).unwrap();
        assert_eq!(tables.len(), 5);

        let report = pipeline.run(&mut dest, date()).unwrap();
        let human_ops = report.load.result("HumanOps").unwrap();
        assert_eq!(human_ops.outcome, LoadOutcome::Inserted);
        assert_eq!(human_ops.rows_inserted, 1);

        // Same natural keys again: the whole entity fails, nothing doubles.
        let again = pipeline.load_stage(&mut dest, date()).unwrap();
        assert!(again.result("HumanOps").unwrap().outcome.is_failure());
        assert_eq!(dest.fetch_rows("HumanOps", 10).unwrap().len(), 1);
    }

    #[test]
    fn test_pipeline_namespace_override() {
        let tmp = TempDir::new().unwrap();
        let locator = BatchLocator::new(tmp.path());
        let registry = SchemaRegistry::phase1();
        let pipeline = Pipeline::new(&locator, &registry).with_namespace("Staging");

        assert_eq!(pipeline.namespace(), "Staging");
        assert_eq!(pipeline.run_id().len(), 36);
    }
}

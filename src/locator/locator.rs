//! Batch store locator
//!
//! Layout under the data directory:
//!
//! ```text
//! <data_dir>/<YYYY-MM-DD>/phase1_<YYYY-MM-DD>.csv   wide batch
//! <data_dir>/<YYYY-MM-DD>/<Entity>.csv              one per entity
//! <data_dir>/<YYYY-MM-DD>/manifest.json             last shred summary
//! ```
//!
//! The pipeline always targets a fixed lag behind processing time, never
//! "today". One writer per date is assumed.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, Utc};

use super::errors::{LocatorError, LocatorResult};

/// Default distance between processing time and the batch date
pub const DEFAULT_LAG_DAYS: u32 = 3;

const WIDE_BATCH_PREFIX: &str = "phase1_";
const MANIFEST_FILE: &str = "manifest.json";

/// Returns the UTC calendar date `lag_days` before `now`.
pub fn target_date(now: DateTime<Utc>, lag_days: u32) -> NaiveDate {
    (now - Duration::days(i64::from(lag_days))).date_naive()
}

/// Handle to one dated container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchLocation {
    batch_date: NaiveDate,
    dir: PathBuf,
}

impl BatchLocation {
    /// Batch date this location holds
    pub fn batch_date(&self) -> NaiveDate {
        self.batch_date
    }

    /// Container directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `YYYY-MM-DD`
    pub fn date_label(&self) -> String {
        self.batch_date.format("%Y-%m-%d").to_string()
    }

    /// Path of the producer's wide batch
    pub fn wide_batch_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}{}.csv", WIDE_BATCH_PREFIX, self.date_label()))
    }

    /// Path of an entity artifact, named after the entity
    pub fn artifact_path(&self, entity: &str) -> PathBuf {
        self.dir.join(artifact_file_name(entity))
    }

    /// Path of the location manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    /// Removes an artifact left by an earlier shred of this date. Returns
    /// whether one existed.
    pub fn remove_artifact(&self, entity: &str) -> LocatorResult<bool> {
        let path = self.artifact_path(entity);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(LocatorError::Io { path, source: e }),
        }
    }
}

/// File name of an entity artifact
pub fn artifact_file_name(entity: &str) -> String {
    format!("{}.csv", entity)
}

/// Resolves batch dates to dated containers under a data directory.
#[derive(Debug, Clone)]
pub struct BatchLocator {
    data_dir: PathBuf,
}

impl BatchLocator {
    /// Creates a locator rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Root data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the container for `batch_date`, creating it on first use.
    ///
    /// Idempotent: calling twice for the same date returns equal handles to
    /// the same directory.
    pub fn locate(&self, batch_date: NaiveDate) -> LocatorResult<BatchLocation> {
        let location = self.location_for(batch_date);

        fs::create_dir_all(&location.dir).map_err(|e| LocatorError::CreateFailed {
            path: location.dir.clone(),
            source: e,
        })?;

        Ok(location)
    }

    /// Returns the container for `batch_date` only if it already exists.
    pub fn find(&self, batch_date: NaiveDate) -> Option<BatchLocation> {
        let location = self.location_for(batch_date);
        location.dir.is_dir().then_some(location)
    }

    /// Artifact path of `entity` inside `location`.
    pub fn path_for(&self, location: &BatchLocation, entity: &str) -> PathBuf {
        location.artifact_path(entity)
    }

    fn location_for(&self, batch_date: NaiveDate) -> BatchLocation {
        let dir = self
            .data_dir
            .join(batch_date.format("%Y-%m-%d").to_string());
        BatchLocation { batch_date, dir }
    }
}

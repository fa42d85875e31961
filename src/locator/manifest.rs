//! Location manifest
//!
//! `manifest.json` describes what the last shred left in a batch location so
//! external tools can find per-entity outputs without knowing the pipeline:
//!
//! ```json
//! {
//!   "batch_date": "2026-10-13",
//!   "artifacts": {
//!     "HumanOps": {
//!       "file": "HumanOps.csv",
//!       "rows": 187,
//!       "columns": ["log_id", "operator_id", "timestamp", "action_type", "error_flag", "shift"],
//!       "checksum": "crc32:1a2b3c4d"
//!     }
//!   },
//!   "skipped": { "Meteorology": ["humidity_pct"] },
//!   "format_version": 1
//! }
//! ```
//!
//! The manifest carries no wall-clock data: shredding the same batch twice
//! yields the same bytes.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{LocatorError, LocatorResult};

/// One entity artifact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactEntry {
    /// File name inside the location
    pub file: String,
    /// Data rows (header excluded)
    pub rows: usize,
    /// Header columns in file order
    pub columns: Vec<String>,
    /// `crc32:xxxxxxxx` of the file bytes
    pub checksum: String,
}

/// Descriptor of one batch location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocationManifest {
    /// Batch date (YYYY-MM-DD)
    pub batch_date: String,
    /// Entity → artifact
    pub artifacts: BTreeMap<String, ArtifactEntry>,
    /// Entity → required columns absent from the wide batch
    #[serde(default)]
    pub skipped: BTreeMap<String, Vec<String>>,
    /// Manifest format version
    pub format_version: u8,
}

impl LocationManifest {
    /// Creates an empty manifest for a batch date.
    pub fn new(batch_date: impl Into<String>) -> Self {
        Self {
            batch_date: batch_date.into(),
            artifacts: BTreeMap::new(),
            skipped: BTreeMap::new(),
            format_version: 1,
        }
    }

    /// Records a written artifact.
    pub fn add_artifact(&mut self, entity: impl Into<String>, entry: ArtifactEntry) {
        self.artifacts.insert(entity.into(), entry);
    }

    /// Records a skipped entity.
    pub fn add_skipped(&mut self, entity: impl Into<String>, missing: Vec<String>) {
        self.skipped.insert(entity.into(), missing);
    }

    /// Serializes the manifest to pretty-printed JSON.
    pub fn to_json(&self) -> LocatorResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LocatorError::Manifest(format!("Failed to serialize manifest: {}", e)))
    }

    /// Deserializes a manifest from JSON.
    pub fn from_json(json: &str) -> LocatorResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| LocatorError::Manifest(format!("Failed to parse manifest: {}", e)))
    }

    /// Writes the manifest with fsync, replacing any previous one.
    pub fn write_to_file(&self, path: &Path) -> LocatorResult<()> {
        let json = self.to_json()?;
        let io_err = |e| LocatorError::Io {
            path: path.to_path_buf(),
            source: e,
        };

        let mut file = File::create(path).map_err(io_err)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;

        Ok(())
    }

    /// Reads a manifest from disk.
    pub fn read_from_file(path: &Path) -> LocatorResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LocatorError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }
}

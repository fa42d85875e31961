//! Pipeline configuration file
//!
//! Optional JSON file; every field has a default:
//!
//! ```json
//! {
//!   "data_dir": "./csvs",
//!   "lag_days": 3,
//!   "namespace": "Phase1",
//!   "seed": 42,
//!   "registry_path": null
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{ConfigError, ConfigResult};
use crate::schema::is_valid_identifier;

/// Upper bound on how far back a run may target
const MAX_LAG_DAYS: u32 = 3650;

/// Pipeline settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root of the dated batch containers
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Batch date = processing date minus this many days
    #[serde(default = "default_lag_days")]
    pub lag_days: u32,

    /// Destination namespace holding the entity tables
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Seed for the synthetic producer
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Registry JSON file; the built-in Phase1 registry when absent
    #[serde(default)]
    pub registry_path: Option<PathBuf>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./csvs")
}
fn default_lag_days() -> u32 {
    3
}
fn default_namespace() -> String {
    "Phase1".to_string()
}
fn default_seed() -> u64 {
    42
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            lag_days: default_lag_days(),
            namespace: default_namespace(),
            seed: default_seed(),
            registry_path: None,
        }
    }
}

impl PipelineConfig {
    /// Loads configuration from a JSON file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Parses and validates configuration JSON.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: PipelineConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if !is_valid_identifier(&self.namespace) {
            return Err(ConfigError::Invalid(format!(
                "namespace '{}' is not a valid identifier",
                self.namespace
            )));
        }

        if self.lag_days > MAX_LAG_DAYS {
            return Err(ConfigError::Invalid(format!(
                "lag_days must be <= {}, got {}",
                MAX_LAG_DAYS, self.lag_days
            )));
        }

        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_dir must not be empty".into()));
        }

        Ok(())
    }
}

//! Destination connection settings
//!
//! Read from the environment:
//!
//! | variable             | default     |
//! |----------------------|-------------|
//! | `MYSQL_HOST`         | `localhost` |
//! | `MYSQL_PORT`         | `3306`      |
//! | `MYSQL_DB`           | `defaultdb` |
//! | `MYSQL_USER`         | empty       |
//! | `MYSQL_PASSWORD`     | empty       |
//! | `MYSQL_TIMEOUT_SECS` | `10`        |
//!
//! Empty values count as unset. A `.env` file, when present, fills in
//! variables the process environment does not already set.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::errors::{ConfigError, ConfigResult};

pub const ENV_HOST: &str = "MYSQL_HOST";
pub const ENV_PORT: &str = "MYSQL_PORT";
pub const ENV_DB: &str = "MYSQL_DB";
pub const ENV_USER: &str = "MYSQL_USER";
pub const ENV_PASSWORD: &str = "MYSQL_PASSWORD";
pub const ENV_TIMEOUT: &str = "MYSQL_TIMEOUT_SECS";

/// Connection settings for the relational destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationConfig {
    pub host: String,
    pub port: u16,
    /// Database used at connect time (tables live in the pipeline namespace)
    pub database: String,
    pub user: String,
    pub password: String,
    /// Ceiling for connect, read and write
    pub timeout_secs: u64,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            database: "defaultdb".to_string(),
            user: String::new(),
            password: String::new(),
            timeout_secs: 10,
        }
    }
}

impl DestinationConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through an arbitrary lookup (environment, map, ...).
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get(ENV_PORT) {
            Some(raw) => parse_number::<u16>(ENV_PORT, &raw)?,
            None => defaults.port,
        };

        let timeout_secs = match get(ENV_TIMEOUT) {
            Some(raw) => parse_number::<u64>(ENV_TIMEOUT, &raw)?,
            None => defaults.timeout_secs,
        };
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnv {
                key: ENV_TIMEOUT.to_string(),
                value: "0".to_string(),
                reason: "must be > 0".to_string(),
            });
        }

        Ok(Self {
            host: get(ENV_HOST).unwrap_or(defaults.host),
            port,
            database: get(ENV_DB).unwrap_or(defaults.database),
            user: get(ENV_USER).unwrap_or(defaults.user),
            password: get(ENV_PASSWORD).unwrap_or(defaults.password),
            timeout_secs,
        })
    }

    /// Connect/read/write timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether credentials were supplied at all
    pub fn has_credentials(&self) -> bool {
        !self.user.is_empty()
    }

    /// Settings safe to log (no password)
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        let credentials = if self.has_credentials() { "supplied" } else { "none" };
        vec![
            ("host", self.host.clone()),
            ("port", self.port.to_string()),
            ("database", self.database.clone()),
            ("user", self.user.clone()),
            ("credentials", credentials.to_string()),
            ("timeout_secs", self.timeout_secs.to_string()),
        ]
    }
}

/// Loads a `.env` file into the process environment.
///
/// `None` searches the working directory and its parents. Returns the file
/// that was loaded. A missing or unreadable file is not an error.
pub fn load_env_file(path: Option<&Path>) -> Option<PathBuf> {
    match path {
        Some(path) => dotenv::from_path(path).ok().map(|_| path.to_path_buf()),
        None => dotenv::dotenv().ok(),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> ConfigResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnv {
        key: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

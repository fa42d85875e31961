//! Configuration
//!
//! - `DestinationConfig`: connection settings from the environment, which a
//!   `.env` file may fill in
//! - `PipelineConfig`: optional JSON file with pipeline settings

mod destination;
mod errors;
mod pipeline;

pub use destination::{
    load_env_file, DestinationConfig, ENV_DB, ENV_HOST, ENV_PASSWORD, ENV_PORT, ENV_TIMEOUT,
    ENV_USER,
};
pub use errors::{ConfigError, ConfigResult};
pub use pipeline::PipelineConfig;

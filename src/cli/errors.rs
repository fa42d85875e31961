//! CLI-specific error types
//!
//! Every CLI error is fatal: it is printed as one JSON object and the process
//! exits non-zero.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::destination::DestinationError;
use crate::pipeline::PipelineError;
use crate::producer::ProducerError;
use crate::schema::SchemaError;
use crate::viewer::ViewerError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file or environment error
    ConfigError,
    /// Registry could not be built
    RegistryError,
    /// I/O error (stdout, batch files)
    IoError,
    /// Wide batch could not be produced
    ProducerFailed,
    /// Shred or load stage aborted
    PipelineFailed,
    /// Destination could not be reached or bound
    DestinationUnavailable,
    /// Bad argument value
    InvalidArgument,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "FAB_CLI_CONFIG_ERROR",
            Self::RegistryError => "FAB_CLI_REGISTRY_ERROR",
            Self::IoError => "FAB_CLI_IO_ERROR",
            Self::ProducerFailed => "FAB_CLI_PRODUCER_FAILED",
            Self::PipelineFailed => "FAB_CLI_PIPELINE_FAILED",
            Self::DestinationUnavailable => "FAB_CLI_DESTINATION_UNAVAILABLE",
            Self::InvalidArgument => "FAB_CLI_INVALID_ARGUMENT",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Bad argument value
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidArgument, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::new(CliErrorCode::RegistryError, e.to_string())
    }
}

impl From<ProducerError> for CliError {
    fn from(e: ProducerError) -> Self {
        Self::new(CliErrorCode::ProducerFailed, e.to_string())
    }
}

impl From<DestinationError> for CliError {
    fn from(e: DestinationError) -> Self {
        Self::new(CliErrorCode::DestinationUnavailable, e.to_string())
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Destination(inner) => inner.into(),
            other => Self::new(CliErrorCode::PipelineFailed, other.to_string()),
        }
    }
}

impl From<ViewerError> for CliError {
    fn from(e: ViewerError) -> Self {
        Self::invalid_argument(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

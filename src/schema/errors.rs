//! Schema error types
//!
//! Error codes:
//! - FAB_UNKNOWN_ENTITY (REJECT)
//! - FAB_SCHEMA_MISMATCH (SKIP)
//! - FAB_INVALID_REGISTRY (FATAL)

use std::collections::BTreeSet;
use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The lookup that raised it fails, nothing else
    Reject,
    /// The entity is skipped for this run, other entities proceed
    Skip,
    /// The registry cannot be used, the process must stop
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Skip => write!(f, "SKIP"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Entity name not registered
    FabUnknownEntity,
    /// Required field entirely absent from the wide batch
    FabSchemaMismatch,
    /// Registry definition is malformed
    FabInvalidRegistry,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::FabUnknownEntity => "FAB_UNKNOWN_ENTITY",
            SchemaErrorCode::FabSchemaMismatch => "FAB_SCHEMA_MISMATCH",
            SchemaErrorCode::FabInvalidRegistry => "FAB_INVALID_REGISTRY",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::FabUnknownEntity => Severity::Reject,
            SchemaErrorCode::FabSchemaMismatch => Severity::Skip,
            SchemaErrorCode::FabInvalidRegistry => Severity::Fatal,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug, Clone)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    entity: Option<String>,
    missing_fields: BTreeSet<String>,
}

impl SchemaError {
    /// Create an unknown entity error
    pub fn unknown_entity(entity: impl Into<String>) -> Self {
        let entity = entity.into();
        Self {
            code: SchemaErrorCode::FabUnknownEntity,
            message: format!("Entity '{}' is not registered", entity),
            entity: Some(entity),
            missing_fields: BTreeSet::new(),
        }
    }

    /// Create a schema mismatch error naming the absent required fields
    pub fn schema_mismatch(entity: impl Into<String>, missing: BTreeSet<String>) -> Self {
        let entity = entity.into();
        let listed: Vec<&str> = missing.iter().map(String::as_str).collect();
        Self {
            code: SchemaErrorCode::FabSchemaMismatch,
            message: format!(
                "Entity '{}' is missing required columns: {{{}}}",
                entity,
                listed.join(", ")
            ),
            entity: Some(entity),
            missing_fields: missing,
        }
    }

    /// Create an invalid registry error
    pub fn invalid_registry(reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::FabInvalidRegistry,
            message: format!("Invalid schema registry: {}", reason.into()),
            entity: None,
            missing_fields: BTreeSet::new(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the entity name if applicable
    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    /// Returns the missing required fields (schema mismatch only)
    pub fn missing_fields(&self) -> &BTreeSet<String> {
        &self.missing_fields
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaErrorCode::FabUnknownEntity.code(), "FAB_UNKNOWN_ENTITY");
        assert_eq!(SchemaErrorCode::FabSchemaMismatch.code(), "FAB_SCHEMA_MISMATCH");
        assert_eq!(SchemaErrorCode::FabInvalidRegistry.code(), "FAB_INVALID_REGISTRY");
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(SchemaErrorCode::FabUnknownEntity.severity(), Severity::Reject);
        assert_eq!(SchemaErrorCode::FabSchemaMismatch.severity(), Severity::Skip);
        assert!(SchemaError::invalid_registry("empty").is_fatal());
    }

    #[test]
    fn test_schema_mismatch_names_missing_fields() {
        let missing: BTreeSet<String> = ["humidity_pct".to_string()].into_iter().collect();
        let err = SchemaError::schema_mismatch("Meteorology", missing);

        assert_eq!(err.entity(), Some("Meteorology"));
        assert!(err.missing_fields().contains("humidity_pct"));
        let display = err.to_string();
        assert!(display.contains("FAB_SCHEMA_MISMATCH"));
        assert!(display.contains("{humidity_pct}"));
    }

    #[test]
    fn test_unknown_entity_display() {
        let err = SchemaError::unknown_entity("Telemetry");
        assert!(err.to_string().contains("'Telemetry' is not registered"));
        assert!(!err.is_fatal());
    }
}

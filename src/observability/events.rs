//! Observable pipeline events
//!
//! Events are explicit and typed. Every log line the pipeline emits names one
//! of these.

use std::fmt;

/// Observable events in a fabload run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Run begins
    RunStart,
    /// Run finished (with or without entity-level skips)
    RunComplete,
    /// Run aborted on a connection-level failure
    RunAborted,

    // Configuration
    /// Configuration loaded
    ConfigLoaded,
    /// Schema registry built
    RegistryLoaded,

    // Locator
    /// Batch location resolved (created if absent)
    BatchLocated,
    /// Location manifest written
    ManifestWritten,

    // Producer
    /// Wide batch written by the producer
    WideBatchWritten,

    // Shredder
    /// Entity dataset extracted from the wide batch
    ShredExtracted,
    /// Entity skipped because required columns are absent
    ShredSchemaMismatch,
    /// Entity artifact written
    ArtifactWritten,

    // Destination
    /// Destination connection attempted
    DestinationConnecting,
    /// Destination connection established
    DestinationConnected,
    /// Destination connection released
    DestinationReleased,
    /// Destination connection failed
    DestinationUnavailable,
    /// Entity table created (or already present)
    TableProvisioned,

    // Reconciler
    /// Columns dropped during reconciliation
    ReconcileDroppedColumns,

    // Loader
    /// Rows inserted for an entity
    LoadInserted,
    /// Entity load skipped (no file, empty, no matching columns)
    LoadSkipped,
    /// Entity load failed, nothing committed for it
    LoadFailed,

    // Viewer
    /// Viewer could not read a table, empty result returned
    ViewFetchFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::RunStart => "RUN_BEGIN",
            Event::RunComplete => "RUN_COMPLETE",
            Event::RunAborted => "RUN_ABORTED",

            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::RegistryLoaded => "REGISTRY_LOADED",

            Event::BatchLocated => "BATCH_LOCATED",
            Event::ManifestWritten => "MANIFEST_WRITTEN",

            Event::WideBatchWritten => "WIDE_BATCH_WRITTEN",

            Event::ShredExtracted => "SHRED_EXTRACTED",
            Event::ShredSchemaMismatch => "SHRED_SCHEMA_MISMATCH",
            Event::ArtifactWritten => "ARTIFACT_WRITTEN",

            Event::DestinationConnecting => "DESTINATION_CONNECTING",
            Event::DestinationConnected => "DESTINATION_CONNECTED",
            Event::DestinationReleased => "DESTINATION_RELEASED",
            Event::DestinationUnavailable => "DESTINATION_UNAVAILABLE",
            Event::TableProvisioned => "TABLE_PROVISIONED",

            Event::ReconcileDroppedColumns => "RECONCILE_DROPPED_COLUMNS",

            Event::LoadInserted => "LOAD_INSERTED",
            Event::LoadSkipped => "LOAD_SKIPPED",
            Event::LoadFailed => "LOAD_FAILED",

            Event::ViewFetchFailed => "VIEW_FETCH_FAILED",
        }
    }

    /// Returns true if this event ends the run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::RunAborted | Event::DestinationUnavailable)
    }

    /// Returns true if this event reports an entity-level recovery
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Event::ShredSchemaMismatch
                | Event::ReconcileDroppedColumns
                | Event::LoadSkipped
                | Event::ViewFetchFailed
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::RunStart,
            Event::RunComplete,
            Event::RunAborted,
            Event::ConfigLoaded,
            Event::RegistryLoaded,
            Event::BatchLocated,
            Event::ManifestWritten,
            Event::WideBatchWritten,
            Event::ShredExtracted,
            Event::ShredSchemaMismatch,
            Event::ArtifactWritten,
            Event::DestinationConnecting,
            Event::DestinationConnected,
            Event::DestinationReleased,
            Event::DestinationUnavailable,
            Event::TableProvisioned,
            Event::ReconcileDroppedColumns,
            Event::LoadInserted,
            Event::LoadSkipped,
            Event::LoadFailed,
            Event::ViewFetchFailed,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_severity_classes() {
        assert!(Event::RunAborted.is_fatal());
        assert!(!Event::LoadFailed.is_fatal());
        assert!(Event::ShredSchemaMismatch.is_warning());
        assert!(!Event::LoadInserted.is_warning());
    }
}

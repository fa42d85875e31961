//! Observability for fabload
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed lifecycle events
//! - Stage scopes that log begin/complete/failed
//!
//! Observability is read-only: it never changes what the pipeline does.
//!
//! ```ignore
//! use fabload::observability::{log_event_with_fields, Event, ObservationScope};
//!
//! log_event_with_fields(Event::LoadInserted, &[("entity", "HumanOps"), ("rows", "42")]);
//!
//! let scope = ObservationScope::new("LOAD");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::ObservationScope;

#[cfg(test)]
pub(crate) use logger::capture_log;

/// Severity an event is logged at
pub fn event_severity(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else if event == Event::LoadFailed {
        Severity::Error
    } else if event.is_warning() {
        Severity::Warn
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(event_severity(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event_severity(event), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_severity_mapping() {
        assert_eq!(event_severity(Event::RunStart), Severity::Info);
        assert_eq!(event_severity(Event::LoadSkipped), Severity::Warn);
        assert_eq!(event_severity(Event::LoadFailed), Severity::Error);
        assert_eq!(event_severity(Event::RunAborted), Severity::Fatal);
    }

    #[test]
    fn test_log_event() {
        log_event(Event::RunStart);
        log_event(Event::RunComplete);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::ConfigLoaded, &[("data_dir", "/tmp/csvs")]);
    }
}

//! Schema registry subsystem
//!
//! Maps each logical entity (one destination table) to the fields a row must
//! carry to belong to it and the further fields kept when present.
//!
//! # Design Principles
//!
//! - Built once, read-only for the rest of the process
//! - Passed explicitly, never reached through global state
//! - Deterministic entity order
//! - Every name is a plain SQL identifier

mod errors;
mod identifier;
mod registry;
mod types;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use identifier::is_valid_identifier;
pub use registry::{SchemaRegistry, PHASE1_ENTITIES, TIMESTAMP_COLUMN};
pub use types::EntitySchema;

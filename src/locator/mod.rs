//! Batch store locator subsystem
//!
//! Resolves a batch date to a dated container on disk and names the
//! per-entity artifacts inside it.
//!
//! # Design Principles
//!
//! - One container per batch date, created on first use
//! - Artifact names derive from the entity name alone
//! - Re-running a date overwrites artifacts, never accumulates
//! - Nothing here deletes a container (retention is external)

mod checksum;
mod errors;
mod locator;
mod manifest;

pub use checksum::{compute_checksum, compute_file_checksum, format_checksum};
pub use errors::{LocatorError, LocatorResult};
pub use locator::{artifact_file_name, target_date, BatchLocation, BatchLocator, DEFAULT_LAG_DAYS};
pub use manifest::{ArtifactEntry, LocationManifest};

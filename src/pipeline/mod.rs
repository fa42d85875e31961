//! Pipeline orchestration
//!
//! ```text
//! wide batch ──shred──▶ per-entity artifacts + manifest
//!                                │
//!            live columns ◀──reconcile──▶ insert (one per entity)
//! ```
//!
//! Shred and load can run separately (`shred_stage`, `load_stage`) or
//! together (`run`).

mod errors;
mod stages;
mod summary;

pub use errors::{PipelineError, PipelineResult};
pub use stages::{load_stage, run, shred_stage, Pipeline, ShredStage, DEFAULT_NAMESPACE};
pub use summary::{RunReport, RunSummary};

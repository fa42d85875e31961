//! Batch loader
//!
//! One atomic multi-row insert per entity per run. Every value passes through
//! `normalize_value` first, so the destination only ever sees text or null.
//! The loader never sends an insert with zero rows or zero columns.

mod loader;
mod result;

pub use loader::BatchLoader;
pub use result::{LoadOutcome, LoadResult};

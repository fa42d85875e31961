//! Batch shredder subsystem
//!
//! Splits one wide, heterogeneous daily batch into per-entity datasets using
//! the schema registry. Rows missing a required field never reach an entity
//! dataset; columns an entity does not declare are dropped.

mod shredder;

pub use shredder::{shred, EntityShred, ShredOutcome, ShredReport, Shredder};

//! fabload - daily shred, reconcile and load of semiconductor fab telemetry
//!
//! A wide daily batch is split into one dataset per registered entity,
//! reconciled against the live destination tables and inserted into the
//! `Phase1` namespace, one atomic insert per entity.

pub mod batch;
pub mod cli;
pub mod config;
pub mod destination;
pub mod loader;
pub mod locator;
pub mod observability;
pub mod pipeline;
pub mod producer;
pub mod reconcile;
pub mod schema;
pub mod shred;
pub mod viewer;

//! Column reconciliation
//!
//! Restricts an entity dataset to the columns its destination table actually
//! has, so schema drift in the producer never fails a load. Columns the table
//! has but the dataset lacks are left to the table's defaults.

mod reconciler;

pub use reconciler::{reconcile, Reconciliation};

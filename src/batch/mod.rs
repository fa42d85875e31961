//! Batch data model and CSV codec
//!
//! - `Value`: one scalar cell (`Null`, `Text`, `Number`, `Timestamp`)
//! - `Record` / `WideBatch`: the heterogeneous daily batch
//! - `EntityDataset`: one entity's rows with a fixed column set
//! - `normalize_value`: the single value → storage text contract

mod csv_io;
mod dataset;
mod errors;
mod normalize;
mod record;
mod value;

pub use csv_io::{read_dataset, read_wide_batch, write_dataset, write_wide_batch};
pub use dataset::EntityDataset;
pub use errors::{BatchError, BatchResult};
pub use normalize::{normalize_row, normalize_value};
pub use record::{Record, WideBatch};
pub use value::{Value, TIMESTAMP_FORMAT};

//! Daily wide-batch producer
//!
//! Builds the union batch the shredder consumes: Meteorology rows from an
//! Open-Meteo archive file (when one is given) followed by the seeded
//! synthetic fab entities, written as `phase1_<date>.csv` in the batch
//! location.

mod errors;
mod synthetic;
mod weather;

pub use errors::{ProducerError, ProducerResult};
pub use synthetic::{shift_for_hour, SyntheticProducer, DEFAULT_SEED, FACILITY_ID};
pub use weather::{archive_url, load_archive, parse_archive, STATION_ID};

use std::path::Path;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::batch::{write_wide_batch, WideBatch};
use crate::locator::BatchLocator;
use crate::observability::{log_event_with_fields, Event};

/// Builds the wide batch for `batch_date` without writing it.
pub fn build_batch(
    batch_date: NaiveDate,
    seed: u64,
    weather: Option<&Path>,
) -> ProducerResult<WideBatch> {
    let mut records = match weather {
        // Separate stream: fab entities are the same with or without weather.
        Some(path) => load_archive(path, &mut StdRng::seed_from_u64(seed.wrapping_add(1)))?,
        None => Vec::new(),
    };

    records.extend(SyntheticProducer::new(batch_date, seed).generate()?);
    Ok(WideBatch::from_records(records))
}

/// Builds and writes the wide batch for `batch_date`. Returns the batch.
pub fn produce(
    locator: &BatchLocator,
    batch_date: NaiveDate,
    seed: u64,
    weather: Option<&Path>,
) -> ProducerResult<WideBatch> {
    let batch = build_batch(batch_date, seed, weather)?;
    let location = locator.locate(batch_date)?;
    let path = location.wide_batch_path();
    write_wide_batch(&path, &batch)?;

    let rows = batch.len().to_string();
    let columns = batch.columns().len().to_string();
    let path_label = path.display().to_string();
    log_event_with_fields(
        Event::WideBatchWritten,
        &[("path", &path_label), ("rows", &rows), ("columns", &columns)],
    );

    Ok(batch)
}

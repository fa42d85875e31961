//! Meteorology rows from an Open-Meteo archive document
//!
//! The document is fetched outside the pipeline (see [`archive_url`]) and
//! read from disk. Hourly arrays are aligned by index; a missing array or a
//! `null` entry becomes a null cell.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use rand::Rng;
use serde::Deserialize;

use super::errors::{ProducerError, ProducerResult};
use crate::batch::{Record, Value};

pub const STATION_ID: &str = "CHANDLER_AZ_01";
pub const LATITUDE: f64 = 33.3062;
pub const LONGITUDE: f64 = -111.8413;

/// AQI above this marks the hour as smog
const SMOG_AQI: u32 = 120;

const HOURLY_VARIABLES: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m,\
     wind_direction_10m,precipitation,pressure_msl";

#[derive(Debug, Deserialize)]
struct ArchiveDocument {
    #[serde(default)]
    hourly: HourlySeries,
}

#[derive(Debug, Default, Deserialize)]
struct HourlySeries {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    relative_humidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    wind_direction_10m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
    #[serde(default)]
    pressure_msl: Vec<Option<f64>>,
}

/// Archive API URL for one UTC day at the fab's coordinates.
pub fn archive_url(date: NaiveDate) -> String {
    format!(
        "https://archive-api.open-meteo.com/v1/archive?latitude={}&longitude={}\
         &start_date={d}&end_date={d}&hourly={}&timezone=UTC",
        LATITUDE,
        LONGITUDE,
        HOURLY_VARIABLES,
        d = date.format("%Y-%m-%d"),
    )
}

/// Reads and parses an archive document from `path`.
pub fn load_archive<R: Rng>(path: &Path, rng: &mut R) -> ProducerResult<Vec<Record>> {
    let json = fs::read_to_string(path).map_err(|e| ProducerError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_archive(&json, rng)
}

/// One record per hourly timestamp, with station id and a synthetic AQI.
pub fn parse_archive<R: Rng>(json: &str, rng: &mut R) -> ProducerResult<Vec<Record>> {
    let doc: ArchiveDocument =
        serde_json::from_str(json).map_err(|e| ProducerError::Parse(e.to_string()))?;
    let hourly = doc.hourly;

    let at = |series: &[Option<f64>], i: usize| Value::from(series.get(i).copied().flatten());

    let records = hourly
        .time
        .iter()
        .enumerate()
        .map(|(i, ts)| {
            let aqi: u32 = rng.gen_range(30..=180);
            let event_flag = if aqi > SMOG_AQI { "smog" } else { "normal" };

            Record::new()
                .with("timestamp", Value::parse_cell(ts))
                .with("temperature_c", at(&hourly.temperature_2m, i))
                .with("humidity_pct", at(&hourly.relative_humidity_2m, i))
                .with("wind_speed_mps", at(&hourly.wind_speed_10m, i))
                .with("wind_direction_deg", at(&hourly.wind_direction_10m, i))
                .with("rain_mm", at(&hourly.precipitation, i))
                .with("pressure_hpa", at(&hourly.pressure_msl, i))
                .with("station_id", STATION_ID)
                .with("aqi", i64::from(aqi))
                .with("event_flag", event_flag)
        })
        .collect();

    Ok(records)
}

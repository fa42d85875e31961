//! Seeded synthetic fab telemetry
//!
//! Same seed and date ⇒ same records. Generators run in a fixed order
//! (facility, process, human ops, lots) on one RNG stream, so adding rows to
//! one generator shifts the ones after it.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::batch::{Record, Value};

use super::errors::ProducerResult;

pub const DEFAULT_SEED: u64 = 42;

pub const FACILITY_ID: &str = "CHANDLER_FAB1";

/// 15-minute slots in a day
const SLOTS_PER_DAY: i64 = 96;

const WAFERS_SAMPLED: usize = 100;
const LOTS: usize = 20;
const WAFERS_PER_LOT: usize = 25;

/// Target critical dimension of the 5 nm node
const CD_TARGET_NM: f64 = 5.0;
/// CD variation beyond which yield is penalized
const CD_PENALTY_THRESHOLD_NM: f64 = 0.6;

const CLEANROOM_CLASSES: [(&str, f64); 3] = [("ISO1", 0.1), ("ISO5", 0.7), ("ISO7", 0.2)];
const POWER_STATUS: [(&str, f64); 3] = [("stable", 0.9), ("dip", 0.07), ("outage", 0.03)];
const HVAC_STATUS: [(&str, f64); 3] = [("nominal", 0.85), ("alert", 0.13), ("fail", 0.02)];
const ANOMALIES: [(&str, f64); 4] = [
    ("none", 0.87),
    ("yield_drop", 0.05),
    ("delay", 0.06),
    ("contamination", 0.02),
];
const ACTION_TYPES: [&str; 3] = ["recipe_change", "tool_reset", "calibration"];
const PROCESS_STEPS: [&str; 6] = ["Coat", "Litho", "Etch", "Deposition", "CMP", "Inspection"];

/// Deterministic generator for the four synthetic entities of one batch date
pub struct SyntheticProducer {
    rng: StdRng,
    batch_date: NaiveDate,
    tool_ids: Vec<String>,
    operators: Vec<String>,
    lots: Vec<String>,
}

impl SyntheticProducer {
    pub fn new(batch_date: NaiveDate, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            batch_date,
            tool_ids: (1..=10).map(|i| format!("TOOL_{:02}", i)).collect(),
            operators: (1..=20).map(|i| format!("OP_{:03}", i)).collect(),
            lots: (1..=LOTS).map(|i| format!("LOT_{:04}", i)).collect(),
        }
    }

    /// The shared RNG, for producers that run after this one
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// All four entities in generation order.
    pub fn generate(&mut self) -> ProducerResult<Vec<Record>> {
        let mut records = self.facility_logs();
        records.extend(self.process_metrics()?);
        records.extend(self.human_ops());
        records.extend(self.wafer_lots());
        Ok(records)
    }

    fn midnight(&self) -> NaiveDateTime {
        self.batch_date.and_time(NaiveTime::MIN)
    }

    fn slots(&self) -> Vec<NaiveDateTime> {
        let start = self.midnight();
        (0..SLOTS_PER_DAY)
            .map(|i| start + Duration::minutes(15 * i))
            .collect()
    }

    /// One reading per 15-minute slot. About one in eleven has no tool.
    pub fn facility_logs(&mut self) -> Vec<Record> {
        let slots = self.slots();
        let mut records = Vec::with_capacity(slots.len());

        for ts in slots {
            let cleanroom = weighted(&mut self.rng, &CLEANROOM_CLASSES);
            let power = weighted(&mut self.rng, &POWER_STATUS);
            let water = round_to(self.rng.gen_range(5.0..20.0), 2);
            let gas = round_to(self.rng.gen_range(380.0..420.0), 1);
            let tool = {
                let pick = self.rng.gen_range(0..=self.tool_ids.len());
                self.tool_ids.get(pick).cloned()
            };
            let hvac = weighted(&mut self.rng, &HVAC_STATUS);

            records.push(
                Record::new()
                    .with("facility_id", FACILITY_ID)
                    .with("timestamp", ts)
                    .with("cleanroom_class", cleanroom)
                    .with("power_status", power)
                    .with("water_quality_ppb", water)
                    .with("gas_pressure_kpa", gas)
                    .with("tool_id", tool)
                    .with("hvac_status", hvac),
            );
        }
        records
    }

    /// 100 sampled wafers × 6 steps.
    pub fn process_metrics(&mut self) -> ProducerResult<Vec<Record>> {
        let cd_variation = Normal::<f64>::new(0.45, 0.15)?;
        let etch_depth_nm = Normal::<f64>::new(60.0, 2.0)?;
        let defect_density = Normal::<f64>::new(0.06, 0.03)?;

        let wafer_ids: Vec<String> = self
            .lots
            .iter()
            .flat_map(|lot| (1..=WAFERS_PER_LOT).map(move |w| format!("WAFER_{}_{}", lot, w)))
            .collect();
        let sampled: Vec<String> = wafer_ids
            .choose_multiple(&mut self.rng, WAFERS_SAMPLED)
            .cloned()
            .collect();

        let mut records = Vec::with_capacity(sampled.len() * PROCESS_STEPS.len());
        for wafer_id in &sampled {
            for step in PROCESS_STEPS {
                let variation: f64 = cd_variation.sample(&mut self.rng).abs();
                let actual = CD_TARGET_NM + variation;
                let penalty = ((variation - CD_PENALTY_THRESHOLD_NM) * 100.0).max(0.0);
                let yield_pct = round_to((99.0 - penalty).clamp(85.0, 99.0), 2);

                let tool = self.tool_ids.choose(&mut self.rng).cloned();
                let etch_depth = round_to(etch_depth_nm.sample(&mut self.rng), 2);
                let defects = round_to(defect_density.sample(&mut self.rng).abs(), 4);

                records.push(
                    Record::new()
                        .with("process_id", format!("{}_{}", wafer_id, step))
                        .with("wafer_id", wafer_id.as_str())
                        .with("step_name", step)
                        .with("tool_id", tool)
                        .with("cd_target_nm", CD_TARGET_NM)
                        .with("cd_variation_nm", round_to(variation, 3))
                        .with("cd_actual_nm", round_to(actual, 3))
                        .with("etch_depth_nm", etch_depth)
                        .with("defect_density_cm2", defects)
                        .with("yield_pct", yield_pct),
                );
            }
        }
        Ok(records)
    }

    /// One to three operator actions per slot, inside the slot's hour.
    pub fn human_ops(&mut self) -> Vec<Record> {
        let mut records = Vec::new();

        for slot in self.slots() {
            let shift = shift_for_hour(slot.hour());
            let actions = self.rng.gen_range(1..4);

            for i in 0..actions {
                let operator = self
                    .operators
                    .choose(&mut self.rng)
                    .cloned()
                    .unwrap_or_default();
                let minute = self.rng.gen_range(0..60);
                let second = self.rng.gen_range(0..60);
                let at = slot
                    .with_minute(minute)
                    .and_then(|t| t.with_second(second))
                    .unwrap_or(slot);
                let action = ACTION_TYPES.choose(&mut self.rng).copied().unwrap_or("calibration");
                let error_flag = self.rng.gen::<f64>() < 0.04;

                records.push(
                    Record::new()
                        .with(
                            "log_id",
                            format!("LOG_{}_{}_{}", operator, at.format("%Y%m%d%H%M%S"), i),
                        )
                        .with("operator_id", operator)
                        .with("timestamp", at)
                        .with("action_type", action)
                        .with("error_flag", error_flag)
                        .with("shift", shift),
                );
            }
        }
        records
    }

    /// One row per lot. Lots with an anomaly go to review.
    pub fn wafer_lots(&mut self) -> Vec<Record> {
        let midnight = self.midnight();
        let mut records = Vec::with_capacity(self.lots.len());

        for lot in &self.lots {
            let start = midnight + Duration::hours(self.rng.gen_range(0..16));
            let wafer_count: i64 = self.rng.gen_range(15..25);
            let duration_hr: f64 = self.rng.gen_range(8.0..20.0);
            let anomaly = weighted(&mut self.rng, &ANOMALIES);
            let end = start + Duration::milliseconds((duration_hr * 3_600_000.0).round() as i64);

            records.push(
                Record::new()
                    .with("lot_id", lot.as_str())
                    .with("wafer_count", wafer_count)
                    .with("start_time", start)
                    .with("end_time", end)
                    .with("avg_process_time_hr", round_to(duration_hr / wafer_count as f64, 2))
                    .with("anomaly", anomaly)
                    .with("final_status", if anomaly == "none" { "accepted" } else { "review" }),
            );
        }
        records
    }
}

/// Shift worked at a given hour (UTC)
pub fn shift_for_hour(hour: u32) -> &'static str {
    match hour {
        6..=13 => "morning",
        14..=21 => "evening",
        _ => "night",
    }
}

fn weighted<R: Rng>(rng: &mut R, choices: &[(&'static str, f64)]) -> &'static str {
    match WeightedIndex::new(choices.iter().map(|(_, w)| *w)) {
        Ok(index) => choices[index.sample(rng)].0,
        Err(_) => choices.first().map(|(c, _)| *c).unwrap_or_default(),
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

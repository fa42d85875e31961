//! Value normalization to storage text
//!
//! The destination stores every non-key field as text. This module is the
//! one place where a `Value` becomes that text:
//!
//! - `Null`, non-finite numbers, blank text and missing-value markers →
//!   storage null (`None`)
//! - integral numbers with magnitude below 1e15 → no fractional part (`24`)
//! - other numbers → shortest round-trip decimal (`0.0612`)
//! - timestamps → `YYYY-MM-DD HH:MM:SS`
//! - text → unchanged
//!
//! Artifacts on disk and rows sent to the destination both go through
//! `normalize_value`, so a value read back from either matches exactly.

use super::value::{Value, TIMESTAMP_FORMAT};

/// Largest magnitude rendered as an integer
const INTEGRAL_LIMIT: f64 = 1e15;

/// Normalizes one value to its storage text, `None` meaning storage null.
pub fn normalize_value(value: &Value) -> Option<String> {
    if value.is_null() {
        return None;
    }
    match value {
        Value::Null => None,
        Value::Number(n) => Some(render_number(*n)),
        Value::Timestamp(ts) => Some(ts.format(TIMESTAMP_FORMAT).to_string()),
        Value::Text(s) => Some(s.clone()),
    }
}

/// Normalizes a full row.
pub fn normalize_row(row: &[Value]) -> Vec<Option<String>> {
    row.iter().map(normalize_value).collect()
}

fn render_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < INTEGRAL_LIMIT {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

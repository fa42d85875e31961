//! Scalar cell values
//!
//! Cells arrive as text (CSV) or as typed values (producer). Both are held as
//! a `Value` so that no step depends on implicit coercion.

use std::fmt;

use chrono::NaiveDateTime;

/// Canonical timestamp rendering
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Accepted timestamp spellings, tried in order
const TIMESTAMP_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Missing-value spellings written by the upstream producers
const NULL_MARKERS: [&str; 5] = ["NaN", "nan", "<NA>", "NaT", "None"];

/// A single scalar cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent or not-a-number
    Null,
    /// Free text
    Text(String),
    /// Numeric reading
    Number(f64),
    /// Calendar timestamp without zone (all producer times are UTC)
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Classifies one raw text cell.
    ///
    /// Empty cells and missing-value markers become `Null`. Decimal text
    /// becomes `Number`, except digit strings with a leading zero (`007`),
    /// which stay `Text` so identifiers keep their padding. Recognized
    /// timestamp spellings become `Timestamp`. Anything else is `Text`.
    pub fn parse_cell(raw: &str) -> Value {
        if is_null_text(raw) {
            return Value::Null;
        }
        let trimmed = raw.trim();

        if looks_numeric(trimmed) {
            if let Ok(n) = trimmed.parse::<f64>() {
                if n.is_nan() {
                    return Value::Null;
                }
                if n.is_finite() {
                    return Value::Number(n);
                }
            }
        }

        for format in TIMESTAMP_INPUT_FORMATS {
            if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Value::Timestamp(ts);
            }
        }

        Value::Text(raw.to_string())
    }

    /// Whether this cell counts as missing.
    ///
    /// Same rule as `parse_cell`: blank text and the missing-value markers
    /// are null, so a value keeps its nullness through an artifact.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Number(n) => !n.is_finite(),
            Value::Text(s) => is_null_text(s),
            Value::Timestamp(_) => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Text(if b { "True" } else { "False" }.to_string())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(ts: NaiveDateTime) -> Self {
        Value::Timestamp(ts)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match super::normalize::normalize_value(self) {
            Some(text) => write!(f, "{}", text),
            None => write!(f, "NULL"),
        }
    }
}

fn is_null_text(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || NULL_MARKERS.contains(&trimmed)
}

/// Plain decimal / exponent text, without a zero-padded integer part
fn looks_numeric(s: &str) -> bool {
    let unsigned = s.strip_prefix(['-', '+']).unwrap_or(s);
    let mut chars = unsigned.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() || c == '.' => {}
        _ => return false,
    }
    if !unsigned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'))
    {
        return false;
    }
    let int_part = unsigned.split(['.', 'e', 'E']).next().unwrap_or("");
    !(int_part.len() > 1 && int_part.starts_with('0'))
}

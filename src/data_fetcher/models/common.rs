//! Lenient conversions for provider payloads. Providers disagree on whether
//! numbers are JSON numbers or strings, so every accessor accepts both.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireTeam {
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub abbreviation: Option<String>,
}

impl WireTeam {
    /// Best available human-readable name
    pub fn best_name(&self) -> Option<String> {
        self.display_name
            .as_deref()
            .or(self.name.as_deref())
            .or(self.abbreviation.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Numeric value from a JSON number or a numeric string such as `"1,204.5"`.
pub fn lenient_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

pub fn lenient_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => parse_number(s).map(|f| f.round() as i64),
        _ => None,
    }
}

/// Parses a number out of display text: thousands separators, a leading
/// `#` and surrounding whitespace are ignored.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_start_matches('#')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Calendar date of a provider timestamp. Accepts RFC 3339, ESPN's
/// minute-precision `2024-09-07T16:00Z`, and bare `YYYY-MM-DD`.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// First `max` characters of a raw fragment, for log messages.
pub fn fragment(value: &Value, max: usize) -> String {
    value.to_string().chars().take(max).collect()
}

//! Raw input documents as the collecting collaborators produce them.
//!
//! Nothing here is validated: dates are arbitrary strings and may be
//! missing or malformed. `mov-core` normalizes these into
//! [`Event`](crate::Event) and [`TrendPoint`](crate::TrendPoint) values,
//! dropping whatever cannot be parsed.
//!
//! Individual fields are read leniently. A wrongly typed date or value
//! becomes `None` for that record alone, so one bad record never fails
//! the whole document.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One unvalidated event record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Event date in any supported format. Missing dates drop the event.
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
    /// Value to distribute. Missing or non-numeric magnitudes drop the event.
    #[serde(default, deserialize_with = "lenient_number")]
    pub magnitude: Option<f64>,
    /// Optional end of a multi-day event.
    #[serde(default, deserialize_with = "lenient_text")]
    pub window_end: Option<String>,
    /// Optional collaborator label.
    #[serde(default)]
    pub tag: Option<String>,
}

/// One unvalidated `{date, value}` sample of an external series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTrendPoint {
    /// Sample date in any supported format.
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
    /// Sample value. Missing or non-numeric values drop the point.
    #[serde(default, deserialize_with = "lenient_number")]
    pub value: Option<f64>,
}

/// Complete input document for one valuation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationInput {
    /// Artist identifier, used for reporting and cache keys.
    #[serde(default)]
    pub artist: Option<String>,
    /// Explicit timeline end; overrides the configured end date.
    #[serde(default, deserialize_with = "lenient_text")]
    pub end_date: Option<String>,
    /// Event lists keyed by category name. Absent categories are empty;
    /// unknown names are skipped during normalization.
    #[serde(default)]
    pub events: BTreeMap<String, Vec<RawEvent>>,
    /// Externally computed fandom value trend (`FV_t`).
    #[serde(default)]
    pub fan_value_trend: Vec<RawTrendPoint>,
    /// Externally computed management value series.
    #[serde(default)]
    pub management_value: Vec<RawTrendPoint>,
}

impl ValuationInput {
    /// Total number of raw events across all categories.
    pub fn event_count(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }
}

/// Strings pass through, numbers keep their textual form so they can be
/// reported, anything else reads as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

/// Numbers and numeric strings parse, anything else reads as absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

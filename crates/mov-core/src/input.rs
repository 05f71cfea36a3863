//! Normalization of raw input documents.
//!
//! Collaborators hand over dates in whatever shape their source used.
//! Anything that cannot be turned into a calendar date, and any magnitude
//! that is missing, negative, or not finite, is dropped here with a
//! warning. Event lists under unknown category names are skipped. The
//! engine only ever sees clean [`Event`] and [`TrendPoint`] values.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use mov_types::{Category, Event, RawEvent, RawTrendPoint, TrendPoint, ValuationInput};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Artist name used when the input document does not carry one.
pub const UNKNOWN_ARTIST: &str = "unknown";

/// Counts of records dropped during normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DroppedEvents {
    /// Events whose date was missing or unparseable.
    pub invalid_date: usize,
    /// Events whose magnitude was missing, negative, or not finite.
    pub invalid_magnitude: usize,
    /// Trend points with a bad date or a missing or unusable value.
    pub invalid_trend_points: usize,
    /// Events listed under a category name the engine does not know.
    pub unknown_category: usize,
}

impl DroppedEvents {
    /// Events dropped for any reason.
    pub const fn events(&self) -> usize {
        self.invalid_date
            .saturating_add(self.invalid_magnitude)
            .saturating_add(self.unknown_category)
    }
}

/// A validated input document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedInput {
    /// Artist identifier.
    pub artist: String,
    /// Explicit timeline end from the document, if valid.
    pub end_date: Option<NaiveDate>,
    /// Clean events keyed by category.
    pub events: BTreeMap<Category, Vec<Event>>,
    /// Clean fan value trend points.
    pub fan_value_trend: Vec<TrendPoint>,
    /// Clean management value points.
    pub management_value: Vec<TrendPoint>,
    /// What was dropped along the way.
    pub dropped: DroppedEvents,
}

impl NormalizedInput {
    /// Dates of every clean event.
    pub fn event_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.events.values().flatten().map(|e| e.date)
    }

    /// Dates of every clean trend point, both series.
    pub fn trend_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.fan_value_trend
            .iter()
            .chain(&self.management_value)
            .map(|p| p.date)
    }
}

/// Parse a date in any of the accepted input formats.
///
/// Accepted: `2023-05-31`, `2023.05.31` (optionally with a trailing dot),
/// `2023/05/31`, RFC 3339 timestamps (converted to UTC), and naive
/// timestamps `2023-05-31T10:00:00[.fff]` or `2023-05-31 10:00:00`.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s.trim_end_matches('.'), "%Y.%m.%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y/%m/%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(s) {
        return Some(stamp.with_timezone(&Utc).date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|stamp| stamp.date())
}

/// Validate a raw input document.
pub fn normalize(input: &ValuationInput) -> NormalizedInput {
    let mut dropped = DroppedEvents::default();

    let mut events = BTreeMap::new();
    for (name, raw_events) in &input.events {
        let Some(category) = Category::from_name(name) else {
            warn!(
                category = name.as_str(),
                events = raw_events.len(),
                "Skipping events under unknown category"
            );
            dropped.unknown_category = dropped.unknown_category.saturating_add(raw_events.len());
            continue;
        };
        let clean: Vec<Event> = raw_events
            .iter()
            .filter_map(|raw| normalize_event(category, raw, &mut dropped))
            .collect();
        events.insert(category, clean);
    }

    let end_date = input.end_date.as_deref().and_then(|raw| {
        let parsed = parse_event_date(raw);
        if parsed.is_none() {
            warn!(end_date = raw, "Unparseable end date ignored");
        }
        parsed
    });

    NormalizedInput {
        artist: input
            .artist
            .clone()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_owned()),
        end_date,
        events,
        fan_value_trend: normalize_trend("fan_value_trend", &input.fan_value_trend, &mut dropped),
        management_value: normalize_trend(
            "management_value",
            &input.management_value,
            &mut dropped,
        ),
        dropped,
    }
}

fn normalize_event(category: Category, raw: &RawEvent, dropped: &mut DroppedEvents) -> Option<Event> {
    let Some(date) = raw.date.as_deref().and_then(parse_event_date) else {
        warn!(
            category = %category,
            date = raw.date.as_deref().unwrap_or("<missing>"),
            tag = raw.tag.as_deref().unwrap_or(""),
            "Dropping event with unparseable date"
        );
        dropped.invalid_date = dropped.invalid_date.saturating_add(1);
        return None;
    };
    let Some(magnitude) = raw.magnitude.filter(|m| m.is_finite() && *m >= 0.0) else {
        warn!(
            category = %category,
            date = %date,
            magnitude = ?raw.magnitude,
            "Dropping event with invalid magnitude"
        );
        dropped.invalid_magnitude = dropped.invalid_magnitude.saturating_add(1);
        return None;
    };

    let window_end = raw.window_end.as_deref().and_then(|w| {
        let parsed = parse_event_date(w);
        if parsed.is_none() {
            debug!(category = %category, window_end = w, "Ignoring unparseable window end");
        }
        parsed
    });

    Some(Event {
        category,
        date,
        magnitude,
        window_end,
        tag: raw.tag.clone(),
    })
}

fn normalize_trend(
    series: &'static str,
    points: &[RawTrendPoint],
    dropped: &mut DroppedEvents,
) -> Vec<TrendPoint> {
    points
        .iter()
        .filter_map(|raw| {
            let date = raw.date.as_deref().and_then(parse_event_date);
            let value = raw.value.filter(|v| v.is_finite() && *v >= 0.0);
            match date.zip(value) {
                Some((date, value)) => Some(TrendPoint::new(date, value)),
                None => {
                    warn!(
                        series,
                        date = raw.date.as_deref().unwrap_or("<missing>"),
                        value = ?raw.value,
                        "Dropping invalid trend point"
                    );
                    dropped.invalid_trend_points = dropped.invalid_trend_points.saturating_add(1);
                    None
                }
            }
        })
        .collect()
}

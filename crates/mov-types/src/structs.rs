//! Core records of the valuation engine.
//!
//! [`Event`] and [`TrendPoint`] are normalized inputs: dates are already
//! parsed and validated, magnitudes are finite and non-negative.
//! [`AggregateRecord`] is the engine's only output artifact, one per
//! timeline month.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Category;

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A discrete occurrence to be spread over the monthly timeline.
///
/// Events are immutable once created. The engine never mutates or
/// retains them beyond a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Which decay model and weight apply to this event.
    pub category: Category,
    /// Date of the release, post, concert, or snapshot.
    pub date: NaiveDate,
    /// Scalar value to distribute. Always finite and `>= 0`.
    pub magnitude: f64,
    /// Last day of a multi-day event (tour, drama run), if known.
    pub window_end: Option<NaiveDate>,
    /// Free-form label supplied by the collaborator (album title, post id).
    pub tag: Option<String>,
}

impl Event {
    /// Create an event without a window end or tag.
    pub const fn new(category: Category, date: NaiveDate, magnitude: f64) -> Self {
        Self {
            category,
            date,
            magnitude,
            window_end: None,
            tag: None,
        }
    }
}

// ---------------------------------------------------------------------------
// TrendPoint
// ---------------------------------------------------------------------------

/// One `{date, value}` sample of an externally computed monthly series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TrendPoint {
    /// Sample date; bucketed to its month-end on the timeline.
    pub date: NaiveDate,
    /// Sample value. Always finite and `>= 0`.
    pub value: f64,
}

impl TrendPoint {
    /// Create a trend point.
    pub const fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

// ---------------------------------------------------------------------------
// AggregateRecord
// ---------------------------------------------------------------------------

/// Full breakdown of one timeline month.
///
/// Every component holds its weighted contribution, so the record is
/// self-describing: `total` is exactly the sum of `fan_value`,
/// `portfolio_value`, `live_content_value`, and `management_value`, and
/// each of those is the sum of its member components. Absent categories
/// are explicit zeros, never missing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AggregateRecord {
    /// Month-end date of this record (`YYYY-MM-DD`).
    pub date: NaiveDate,
    /// Weighted fandom value trend (`FV_t`).
    pub fan_value: f64,
    /// Weighted streaming value.
    pub streaming: f64,
    /// Weighted popularity value.
    pub popularity: f64,
    /// Weighted physical retail value.
    pub retail: f64,
    /// `streaming + popularity + retail` (`PFV_t`).
    pub portfolio_value: f64,
    /// Weighted concert value.
    pub concert: f64,
    /// Weighted Twitter engagement value.
    pub social_twitter: f64,
    /// Weighted `YouTube` engagement value.
    pub social_youtube: f64,
    /// Weighted Instagram engagement value.
    pub social_instagram: f64,
    /// Weighted merchandise value.
    pub merchandise: f64,
    /// `concert + social_* + merchandise` (`PCV_t`).
    pub live_content_value: f64,
    /// Weighted broadcast appearance value.
    pub broadcast: f64,
    /// Weighted external management series.
    pub management: f64,
    /// `broadcast + management` (`MRV_t`).
    pub management_value: f64,
    /// Master overall value for the month (`MOV_t`).
    pub total: f64,
    /// Running sum of `total` up to and including this month.
    pub cumulative_total: f64,
}

impl AggregateRecord {
    /// All-zero record for the given month.
    pub const fn zero(date: NaiveDate) -> Self {
        Self {
            date,
            fan_value: 0.0,
            streaming: 0.0,
            popularity: 0.0,
            retail: 0.0,
            portfolio_value: 0.0,
            concert: 0.0,
            social_twitter: 0.0,
            social_youtube: 0.0,
            social_instagram: 0.0,
            merchandise: 0.0,
            live_content_value: 0.0,
            broadcast: 0.0,
            management: 0.0,
            management_value: 0.0,
            total: 0.0,
            cumulative_total: 0.0,
        }
    }

    /// Weighted contribution of a single category in this month.
    pub const fn category_value(&self, category: Category) -> f64 {
        match category {
            Category::Streaming => self.streaming,
            Category::Popularity => self.popularity,
            Category::Retail => self.retail,
            Category::Concert => self.concert,
            Category::SocialTwitter => self.social_twitter,
            Category::SocialYoutube => self.social_youtube,
            Category::SocialInstagram => self.social_instagram,
            Category::Merchandise => self.merchandise,
            Category::Broadcast => self.broadcast,
        }
    }

    /// Every leaf component with its field name, in serialization order.
    pub const fn components(&self) -> [(&'static str, f64); 11] {
        [
            ("fan_value", self.fan_value),
            ("streaming", self.streaming),
            ("popularity", self.popularity),
            ("retail", self.retail),
            ("concert", self.concert),
            ("social_twitter", self.social_twitter),
            ("social_youtube", self.social_youtube),
            ("social_instagram", self.social_instagram),
            ("merchandise", self.merchandise),
            ("broadcast", self.broadcast),
            ("management", self.management),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn may_2023() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 5, 31).unwrap_or_default()
    }

    #[test]
    fn record_serializes_flat_with_iso_date() {
        let mut record = AggregateRecord::zero(may_2023());
        record.merchandise = 210.0;
        record.live_content_value = 210.0;
        record.total = 210.0;
        record.cumulative_total = 210.0;

        let value = serde_json::to_value(record).unwrap_or_default();
        assert_eq!(value["date"], "2023-05-31");
        assert_eq!(value["merchandise"], 210.0);
        assert_eq!(value["streaming"], 0.0);
        assert!(value.get("total").is_some());
    }

    #[test]
    fn category_value_reads_matching_field() {
        let mut record = AggregateRecord::zero(may_2023());
        record.social_youtube = 4.5;
        assert!((record.category_value(Category::SocialYoutube) - 4.5).abs() < f64::EPSILON);
        assert!(record.category_value(Category::SocialTwitter).abs() < f64::EPSILON);
    }

    #[test]
    fn new_event_has_no_window_or_tag() {
        let event = Event::new(Category::Retail, may_2023(), 1000.0);
        assert!(event.tag.is_none());
        assert!(event.window_end.is_none());
    }
}

//! The artifact a valuation run hands back to its collaborators.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use mov_engine::{AuditResult, WeightTable};
use mov_types::{AggregateRecord, Category, RunId};
use serde::{Deserialize, Serialize};

use crate::input::DroppedEvents;

/// Monthly records plus everything needed to interpret them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationReport {
    /// Unique identifier of this run.
    pub run_id: RunId,
    /// Artist the report belongs to.
    pub artist: String,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// One record per timeline month, earliest first.
    pub records: Vec<AggregateRecord>,
    /// Unweighted distributed value of each category over the timeline.
    pub category_totals: BTreeMap<Category, f64>,
    /// Weights the records were combined with.
    pub weights: WeightTable,
    /// Input records dropped during normalization.
    pub dropped_events: DroppedEvents,
    /// Events dated after the timeline end.
    pub excluded_events: usize,
    /// Events dated before the timeline start and anchored to its first month.
    pub advanced_events: usize,
    /// Outcome of the record audit.
    pub audit: AuditResult,
}

impl ValuationReport {
    /// Whether the run produced no months at all.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First timeline month.
    pub fn start(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    /// Last timeline month.
    pub fn end(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Cumulative master value at the last month, or zero for an empty run.
    pub fn final_value(&self) -> f64 {
        self.records.last().map_or(0.0, |r| r.cumulative_total)
    }
}

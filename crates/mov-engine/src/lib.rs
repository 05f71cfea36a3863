//! Temporal valuation aggregation engine.
//!
//! Turns irregular, category-tagged events into one monthly valuation
//! curve. The engine is a pure function of its inputs: it performs no I/O,
//! reads no environment, and holds no state between calls.
//!
//! # Pipeline
//!
//! ```text
//! events ──> TimelineGrid ──> integrate (per category, DecayModel) ──┐
//!                                                                   ├─> combine ──> Vec<AggregateRecord>
//!                      external trend points ──> ExternalSeries ────┘        │
//!                                                                  verify_records
//! ```
//!
//! # Modules
//!
//! - [`month`] -- Month-end calendar arithmetic
//! - [`grid`] -- The shared monthly timeline
//! - [`series`] -- Grid-aligned monthly series
//! - [`decay`] -- The decay model family
//! - [`integrate`] -- Per-category event integration
//! - [`weights`] -- Weight table applied by the combiner
//! - [`combine`] -- Weighted combination into aggregate records
//! - [`cumulative`] -- Running totals
//! - [`audit`] -- Consistency checks on the combined records

pub mod audit;
pub mod combine;
pub mod cumulative;
pub mod decay;
pub mod grid;
pub mod integrate;
pub mod month;
pub mod series;
pub mod weights;

pub use audit::{AuditIssue, AuditResult, ValuationAnomaly, verify_records};
pub use combine::{CategorySeries, ExternalSeries, combine};
pub use cumulative::cumulative;
pub use decay::{
    DecayError, DecayModel, Distribute, MagnitudeScaledWindowDecay, NormalizedExponentialDecay,
    PhaseSchedule, PiecewisePhaseDecay, PointEvent, TriangularRampDecay,
};
pub use grid::{Anchor, TimelineGrid};
pub use integrate::{Integration, integrate, integrate_detailed};
pub use series::MonthlySeries;
pub use weights::{WeightError, WeightTable};

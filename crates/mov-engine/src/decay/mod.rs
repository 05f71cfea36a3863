//! The decay model family.
//!
//! Every model turns one event magnitude into a [`MonthlySeries`] aligned to
//! a [`TimelineGrid`], starting at the event's month. Models never fail at
//! distribution time: zero, negative, or non-finite magnitudes produce an
//! all-zero series and any share that falls outside the grid is dropped.
//! Parameter validation happens once, when the model is constructed.

mod exponential;
mod phase;
mod point;
mod ramp;
mod window;

use chrono::NaiveDate;
use mov_types::Event;

use crate::grid::TimelineGrid;
use crate::series::MonthlySeries;

pub use exponential::NormalizedExponentialDecay;
pub use phase::{PhaseSchedule, PiecewisePhaseDecay};
pub use point::PointEvent;
pub use ramp::TriangularRampDecay;
pub use window::MagnitudeScaledWindowDecay;

/// Errors raised when a decay model is built with unusable parameters.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DecayError {
    /// A parameter is outside the range the model can work with.
    #[error("invalid {model} parameter: {reason}")]
    InvalidParameter {
        /// Model whose parameter was rejected.
        model: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

impl DecayError {
    pub(crate) fn invalid(model: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            model,
            reason: reason.into(),
        }
    }
}

/// Spread a magnitude over the months following an event.
pub trait Distribute {
    /// Distribute `magnitude` starting at the month of `start` onto `grid`.
    fn distribute(&self, magnitude: f64, start: NaiveDate, grid: &TimelineGrid) -> MonthlySeries;
}

/// One of the supported decay shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum DecayModel {
    /// Conserving exponential decay over a long horizon.
    NormalizedExponential(NormalizedExponentialDecay),
    /// Three-phase rate schedule.
    PiecewisePhase(PiecewisePhaseDecay),
    /// Exponential decay inside a magnitude-scaled window.
    MagnitudeScaledWindow(MagnitudeScaledWindowDecay),
    /// Linear ramp up to a peak, then accelerating decline.
    TriangularRamp(TriangularRampDecay),
    /// Whole magnitude in the event month.
    Point(PointEvent),
}

impl DecayModel {
    /// Short model name used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NormalizedExponential(_) => "normalized_exponential",
            Self::PiecewisePhase(_) => "piecewise_phase",
            Self::MagnitudeScaledWindow(_) => "magnitude_scaled_window",
            Self::TriangularRamp(_) => "triangular_ramp",
            Self::Point(_) => "point",
        }
    }

    /// Copy of this model calibrated against a category's full event list.
    ///
    /// Only the window model depends on the whole category: its influence
    /// length is relative to the largest magnitude among `events`.
    #[must_use]
    pub fn calibrated(&self, events: &[Event]) -> Self {
        match self {
            Self::MagnitudeScaledWindow(model) => {
                let reference = events
                    .iter()
                    .map(|e| e.magnitude)
                    .filter(|m| m.is_finite())
                    .fold(0.0_f64, f64::max);
                Self::MagnitudeScaledWindow(model.with_reference_magnitude(reference))
            }
            other => other.clone(),
        }
    }
}

impl Distribute for DecayModel {
    fn distribute(&self, magnitude: f64, start: NaiveDate, grid: &TimelineGrid) -> MonthlySeries {
        match self {
            Self::NormalizedExponential(model) => model.distribute(magnitude, start, grid),
            Self::PiecewisePhase(model) => model.distribute(magnitude, start, grid),
            Self::MagnitudeScaledWindow(model) => model.distribute(magnitude, start, grid),
            Self::TriangularRamp(model) => model.distribute(magnitude, start, grid),
            Self::Point(model) => model.distribute(magnitude, start, grid),
        }
    }
}

impl From<NormalizedExponentialDecay> for DecayModel {
    fn from(model: NormalizedExponentialDecay) -> Self {
        Self::NormalizedExponential(model)
    }
}

impl From<PiecewisePhaseDecay> for DecayModel {
    fn from(model: PiecewisePhaseDecay) -> Self {
        Self::PiecewisePhase(model)
    }
}

impl From<MagnitudeScaledWindowDecay> for DecayModel {
    fn from(model: MagnitudeScaledWindowDecay) -> Self {
        Self::MagnitudeScaledWindow(model)
    }
}

impl From<TriangularRampDecay> for DecayModel {
    fn from(model: TriangularRampDecay) -> Self {
        Self::TriangularRamp(model)
    }
}

impl From<PointEvent> for DecayModel {
    fn from(model: PointEvent) -> Self {
        Self::Point(model)
    }
}

/// Whether a magnitude can contribute anything at all.
pub(crate) const fn usable_magnitude(magnitude: f64) -> bool {
    magnitude.is_finite() && magnitude > 0.0
}

/// Evenly spaced values from `start` to `end` inclusive.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn linspace(start: f64, end: f64, count: usize) -> impl Iterator<Item = f64> {
    let steps = count.saturating_sub(1);
    let step = if steps == 0 {
        0.0
    } else {
        (end - start) / steps as f64
    };
    (0..count).map(move |i| {
        if i == steps && steps > 0 {
            end
        } else {
            start + step * i as f64
        }
    })
}

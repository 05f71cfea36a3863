use chrono::NaiveDate;

use super::{DecayError, Distribute, usable_magnitude};
use crate::grid::TimelineGrid;
use crate::series::MonthlySeries;

/// Exponential decay over a window whose length grows with magnitude.
///
/// `influence = base + (magnitude / reference) * (max - base)`, floored and
/// clamped to `[min, max]`. The reference is the largest magnitude in the
/// category, set through [`DecayModel::calibrated`](super::DecayModel::calibrated);
/// an uncalibrated model treats each event as its own reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnitudeScaledWindowDecay {
    decay_rate: f64,
    base_window: u32,
    max_window: u32,
    min_window: u32,
    reference_magnitude: Option<f64>,
}

impl Default for MagnitudeScaledWindowDecay {
    fn default() -> Self {
        Self {
            decay_rate: 0.1,
            base_window: 2,
            max_window: 12,
            min_window: 1,
            reference_magnitude: None,
        }
    }
}

impl MagnitudeScaledWindowDecay {
    const NAME: &'static str = "magnitude_scaled_window";

    /// Build with `min_window <= base_window <= max_window`.
    pub fn new(
        decay_rate: f64,
        base_window: u32,
        max_window: u32,
        min_window: u32,
    ) -> Result<Self, DecayError> {
        if !(decay_rate.is_finite() && decay_rate >= 0.0) {
            return Err(DecayError::invalid(
                Self::NAME,
                format!("decay_rate must be finite and >= 0, got {decay_rate}"),
            ));
        }
        if !(min_window <= base_window && base_window <= max_window) {
            return Err(DecayError::invalid(
                Self::NAME,
                format!(
                    "windows must satisfy min <= base <= max, got {min_window}/{base_window}/{max_window}"
                ),
            ));
        }
        Ok(Self {
            decay_rate,
            base_window,
            max_window,
            min_window,
            reference_magnitude: None,
        })
    }

    /// Copy with a fixed reference magnitude.
    #[must_use]
    pub const fn with_reference_magnitude(self, reference: f64) -> Self {
        Self {
            reference_magnitude: Some(reference),
            ..self
        }
    }

    /// Number of months an event of `magnitude` influences, or 0 when the
    /// reference magnitude is unusable.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn influence_months(&self, magnitude: f64) -> u32 {
        let reference = self.reference_magnitude.unwrap_or(magnitude);
        if !usable_magnitude(reference) || !usable_magnitude(magnitude) {
            return 0;
        }
        let base = f64::from(self.base_window);
        let spread = f64::from(self.max_window) - base;
        let raw = (base + magnitude / reference * spread).floor();
        let clamped = raw.clamp(f64::from(self.min_window), f64::from(self.max_window));
        clamped as u32
    }
}

impl Distribute for MagnitudeScaledWindowDecay {
    fn distribute(&self, magnitude: f64, start: NaiveDate, grid: &TimelineGrid) -> MonthlySeries {
        let window = self.influence_months(magnitude);
        let shares = (0..window).map(|t| magnitude * (-self.decay_rate * f64::from(t)).exp());
        MonthlySeries::place(grid, start, shares)
    }
}

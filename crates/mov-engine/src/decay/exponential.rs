use chrono::NaiveDate;

use super::{DecayError, Distribute, usable_magnitude};
use crate::grid::TimelineGrid;
use crate::series::MonthlySeries;

/// Exponential decay whose shares sum to the magnitude over a long horizon.
///
/// The decay constant is `k = -ln(residual_rate) / horizon_months`, scaled by
/// an optional rate multiplier. Month `t` receives
/// `magnitude * e^(-k t) / S` where `S` is the sum of `e^(-k t)` over the
/// normalization length: the horizon, or the visible span when that is
/// longer. A grid shorter than the horizon therefore shows only the share
/// realised so far, while a grid covering the horizon receives the full
/// magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedExponentialDecay {
    residual_rate: f64,
    horizon_months: u32,
    rate_multiplier: f64,
}

impl Default for NormalizedExponentialDecay {
    /// 0.1% residual after 70 years.
    fn default() -> Self {
        Self {
            residual_rate: 0.001,
            horizon_months: 840,
            rate_multiplier: 1.0,
        }
    }
}

impl NormalizedExponentialDecay {
    const NAME: &'static str = "normalized_exponential";

    /// Build from a residual rate in `(0, 1)` and a horizon of at least one month.
    pub fn new(residual_rate: f64, horizon_months: u32) -> Result<Self, DecayError> {
        if !(residual_rate.is_finite() && residual_rate > 0.0 && residual_rate < 1.0) {
            return Err(DecayError::invalid(
                Self::NAME,
                format!("residual_rate must be in (0, 1), got {residual_rate}"),
            ));
        }
        if horizon_months == 0 {
            return Err(DecayError::invalid(Self::NAME, "horizon_months must be >= 1"));
        }
        Ok(Self {
            residual_rate,
            horizon_months,
            rate_multiplier: 1.0,
        })
    }

    /// Scale the decay constant, e.g. for catalogues that age faster.
    pub fn with_rate_multiplier(self, multiplier: f64) -> Result<Self, DecayError> {
        if !(multiplier.is_finite() && multiplier > 0.0) {
            return Err(DecayError::invalid(
                Self::NAME,
                format!("rate_multiplier must be positive, got {multiplier}"),
            ));
        }
        Ok(Self {
            rate_multiplier: multiplier,
            ..self
        })
    }

    /// Monthly decay constant `k`.
    pub fn rate(&self) -> f64 {
        -self.residual_rate.ln() / f64::from(self.horizon_months) * self.rate_multiplier
    }

    /// Sum of `e^(-k t)` for `t` in `0..len`, in a form that stays accurate
    /// for tiny `k`.
    fn normalization(&self, len: u32) -> f64 {
        let k = self.rate();
        let denominator = (-k).exp_m1();
        if denominator == 0.0 {
            return f64::from(len);
        }
        (-k * f64::from(len)).exp_m1() / denominator
    }
}

impl Distribute for NormalizedExponentialDecay {
    fn distribute(&self, magnitude: f64, start: NaiveDate, grid: &TimelineGrid) -> MonthlySeries {
        let span = grid.remaining_from(start);
        if !usable_magnitude(magnitude) || span == 0 {
            return MonthlySeries::for_grid(grid);
        }
        let total = self.normalization(span.max(self.horizon_months));
        if !(total.is_finite() && total > 0.0) {
            return MonthlySeries::for_grid(grid);
        }
        let k = self.rate();
        let shares = (0..span).map(|t| magnitude * (-k * f64::from(t)).exp() / total);
        MonthlySeries::place(grid, start, shares)
    }
}

use chrono::NaiveDate;

use super::{DecayError, Distribute, usable_magnitude};
use crate::grid::TimelineGrid;
use crate::series::MonthlySeries;

/// Linear ramp to a peak, then an accelerating decline that clamps at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangularRampDecay {
    peak_month: u32,
    initial_decay_rate: f64,
    decay_increment: f64,
    max_decay_rate: f64,
    max_fraction: f64,
}

impl Default for TriangularRampDecay {
    fn default() -> Self {
        Self {
            peak_month: 6,
            initial_decay_rate: 0.001,
            decay_increment: 0.0005,
            max_decay_rate: 0.1,
            max_fraction: 0.01,
        }
    }
}

impl TriangularRampDecay {
    const NAME: &'static str = "triangular_ramp";

    /// Build with a peak of at least one month and non-negative rates.
    pub fn new(
        peak_month: u32,
        initial_decay_rate: f64,
        decay_increment: f64,
        max_decay_rate: f64,
        max_fraction: f64,
    ) -> Result<Self, DecayError> {
        if peak_month == 0 {
            return Err(DecayError::invalid(Self::NAME, "peak_month must be >= 1"));
        }
        let rates = [initial_decay_rate, decay_increment, max_decay_rate, max_fraction];
        if rates.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(DecayError::invalid(
                Self::NAME,
                "rates and max_fraction must be finite and >= 0",
            ));
        }
        Ok(Self {
            peak_month,
            initial_decay_rate,
            decay_increment,
            max_decay_rate,
            max_fraction,
        })
    }

    /// Fraction of the magnitude realised `t` months after the event.
    pub fn fraction(&self, t: u32) -> f64 {
        let peak = f64::from(self.peak_month);
        let t = f64::from(t);
        if t <= peak {
            return t / peak * self.max_fraction;
        }
        let past = t - peak;
        let rate = (self.initial_decay_rate + past * self.decay_increment).min(self.max_decay_rate);
        (self.max_fraction - past * rate).max(0.0)
    }
}

impl Distribute for TriangularRampDecay {
    fn distribute(&self, magnitude: f64, start: NaiveDate, grid: &TimelineGrid) -> MonthlySeries {
        if !usable_magnitude(magnitude) {
            return MonthlySeries::for_grid(grid);
        }
        let peak = self.peak_month;
        let shares = (0..grid.remaining_from(start))
            .map(|t| (t, self.fraction(t)))
            .take_while(|(t, fraction)| *t <= peak || *fraction > 0.0)
            .map(|(_, fraction)| magnitude * fraction);
        MonthlySeries::place(grid, start, shares)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    #[test]
    fn ramp_hits_documented_points() {
        let model = TriangularRampDecay::default();
        assert!((1_000.0 * model.fraction(3) - 5.0).abs() < 1e-9);
        assert!((1_000.0 * model.fraction(6) - 10.0).abs() < 1e-9);
        assert!(model.fraction(0).abs() < f64::EPSILON);
    }

    #[test]
    fn decline_clamps_at_zero() {
        let model = TriangularRampDecay::default();
        let first_zero = (7..60).find(|t| model.fraction(*t) <= 0.0);
        assert_eq!(first_zero, Some(10));
        assert!((10..60).all(|t| model.fraction(t) <= 0.0));
    }

    #[test]
    fn series_rises_then_falls() {
        let start = date(2023, 1, 31);
        let grid = TimelineGrid::between(start, date(2024, 12, 31));
        let series = TriangularRampDecay::default().distribute(1_000.0, start, &grid);
        let values = series.values();
        let (rise, fall) = values.split_at(7);
        assert!(rise.windows(2).all(|w| matches!(w, [a, b] if b >= a)));
        assert!(fall.windows(2).all(|w| matches!(w, [a, b] if b <= a)));
        assert!(series.value_at(20).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_zero_peak() {
        assert!(TriangularRampDecay::new(0, 0.001, 0.0005, 0.1, 0.01).is_err());
        assert!(TriangularRampDecay::new(6, 0.001, -0.0005, 0.1, 0.01).is_err());
    }
}

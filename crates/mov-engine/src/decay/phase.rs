use chrono::NaiveDate;

use super::{DecayError, Distribute, linspace, usable_magnitude};
use crate::grid::TimelineGrid;
use crate::series::MonthlySeries;

/// Rate schedule for [`PiecewisePhaseDecay`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSchedule {
    /// Rate in the release month.
    pub initial_start: f64,
    /// Rate at the end of the initial phase.
    pub initial_end: f64,
    /// Length of the steep initial phase.
    pub initial_months: u32,
    /// Rate at the end of the middle phase.
    pub middle_end: f64,
    /// Length of the middle phase.
    pub middle_months: u32,
    /// First rate of the geometric tail.
    pub tail_base: f64,
    /// Tail factor applied once per `tail_period` months.
    pub tail_factor: f64,
    /// Months per tail factor step.
    pub tail_period: f64,
    /// Spans at or below this length use the compressed two-phase shape.
    pub compress_at: u32,
}

impl Default for PhaseSchedule {
    fn default() -> Self {
        Self {
            initial_start: 0.6,
            initial_end: 0.4,
            initial_months: 3,
            middle_end: 0.3,
            middle_months: 6,
            tail_base: 0.3,
            tail_factor: 0.9,
            tail_period: 3.0,
            compress_at: 12,
        }
    }
}

/// Steep initial decline, moderate middle phase, slow geometric tail.
///
/// Rates are absolute fractions of the magnitude per month and are not
/// renormalized, so the distributed total depends on the span.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PiecewisePhaseDecay {
    schedule: PhaseSchedule,
}

impl PiecewisePhaseDecay {
    const NAME: &'static str = "piecewise_phase";

    /// Build from a schedule whose rates never increase from phase to phase.
    pub fn new(schedule: PhaseSchedule) -> Result<Self, DecayError> {
        let s = &schedule;
        let rates = [s.initial_start, s.initial_end, s.middle_end, s.tail_base];
        if rates.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(DecayError::invalid(Self::NAME, "rates must be finite and >= 0"));
        }
        if !(s.initial_start >= s.initial_end
            && s.initial_end >= s.middle_end
            && s.middle_end >= s.tail_base)
        {
            return Err(DecayError::invalid(
                Self::NAME,
                "rates must be non-increasing across phases",
            ));
        }
        if !(s.tail_factor.is_finite() && s.tail_factor > 0.0 && s.tail_factor <= 1.0) {
            return Err(DecayError::invalid(Self::NAME, "tail_factor must be in (0, 1]"));
        }
        if !(s.tail_period.is_finite() && s.tail_period > 0.0) {
            return Err(DecayError::invalid(Self::NAME, "tail_period must be positive"));
        }
        if s.initial_months == 0 {
            return Err(DecayError::invalid(Self::NAME, "initial_months must be >= 1"));
        }
        Ok(Self { schedule })
    }

    /// Rates for the first `months` months after release.
    pub fn rates(&self, months: u32) -> Vec<f64> {
        let s = &self.schedule;
        let Ok(len) = usize::try_from(months) else {
            return Vec::new();
        };
        let initial = usize::try_from(s.initial_months).unwrap_or(usize::MAX);
        if months > s.compress_at {
            let middle = usize::try_from(s.middle_months).unwrap_or(usize::MAX);
            linspace(s.initial_start, s.initial_end, initial)
                .chain(linspace(s.initial_end, s.middle_end, middle))
                .chain((0_u32..).map(|i| {
                    s.tail_base * s.tail_factor.powf(f64::from(i) / s.tail_period)
                }))
                .take(len)
                .collect()
        } else {
            let middle = len.saturating_sub(initial.saturating_sub(1));
            linspace(s.initial_start, s.initial_end, initial.min(len))
                .chain(linspace(s.initial_end, s.middle_end, middle))
                .take(len)
                .collect()
        }
    }
}

impl Distribute for PiecewisePhaseDecay {
    fn distribute(&self, magnitude: f64, start: NaiveDate, grid: &TimelineGrid) -> MonthlySeries {
        if !usable_magnitude(magnitude) {
            return MonthlySeries::for_grid(grid);
        }
        let span = grid.remaining_from(start);
        let shares = self.rates(span).into_iter().map(|rate| magnitude * rate);
        MonthlySeries::place(grid, start, shares)
    }
}

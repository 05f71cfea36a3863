//! Per-category series integration.
//!
//! Each event is anchored on the grid, distributed through the category's
//! decay model, and summed into a single [`MonthlySeries`]. An event dated
//! before the grid starts is moved to the first grid month rather than
//! lost; an event dated after the grid ends has no subsequent month to
//! anchor to and is excluded with a warning.

use mov_types::Event;
use tracing::{debug, warn};

use crate::decay::{DecayModel, Distribute};
use crate::grid::{Anchor, TimelineGrid};
use crate::series::MonthlySeries;

/// Outcome of integrating one category.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Integration {
    /// Summed contribution of every placed event.
    pub series: MonthlySeries,
    /// Events distributed onto the grid (including advanced ones).
    pub placed: usize,
    /// Events dated before the grid and anchored to its first month.
    pub advanced: usize,
    /// Events dated after the grid and dropped.
    pub excluded: usize,
}

/// Sum every event's distributed contribution onto `grid`.
pub fn integrate(events: &[Event], model: &DecayModel, grid: &TimelineGrid) -> MonthlySeries {
    integrate_detailed(events, model, grid).series
}

/// Like [`integrate`], also reporting how events were anchored.
///
/// The model is calibrated against `events` first, so window lengths are
/// relative to the largest event of this batch.
pub fn integrate_detailed(
    events: &[Event],
    model: &DecayModel,
    grid: &TimelineGrid,
) -> Integration {
    let model = model.calibrated(events);
    let mut outcome = Integration {
        series: MonthlySeries::for_grid(grid),
        ..Integration::default()
    };

    for event in events {
        let start = match grid.anchor(event.date) {
            Anchor::Exact(month) => month,
            Anchor::Advanced(month) => {
                debug!(
                    category = %event.category,
                    date = %event.date,
                    anchor = %month,
                    "Event predates timeline, anchored to first month"
                );
                outcome.advanced = outcome.advanced.saturating_add(1);
                month
            }
            Anchor::OutOfRange => {
                warn!(
                    category = %event.category,
                    date = %event.date,
                    magnitude = event.magnitude,
                    "Event falls after timeline end, excluded"
                );
                outcome.excluded = outcome.excluded.saturating_add(1);
                continue;
            }
        };

        let contribution = model.distribute(event.magnitude, start, grid);
        debug!(
            category = %event.category,
            model = model.name(),
            start = %start,
            distributed = contribution.sum(),
            "Event distributed"
        );
        outcome.series.accumulate(&contribution);
        outcome.placed = outcome.placed.saturating_add(1);
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decay::PointEvent;
    use chrono::NaiveDate;
    use mov_types::Category;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    #[test]
    fn same_month_point_events_add_up() {
        let grid = TimelineGrid::between(date(2023, 5, 1), date(2023, 6, 30));
        let events = [
            Event::new(Category::Merchandise, date(2023, 5, 3), 120.0),
            Event::new(Category::Merchandise, date(2023, 5, 28), 80.0),
        ];
        let series = integrate(&events, &DecayModel::from(PointEvent), &grid);
        assert_eq!(series.values(), &[200.0, 0.0]);
    }

    #[test]
    fn early_events_are_advanced_late_events_excluded() {
        let grid = TimelineGrid::between(date(2023, 5, 1), date(2023, 6, 30));
        let events = [
            Event::new(Category::Merchandise, date(2022, 1, 3), 10.0),
            Event::new(Category::Merchandise, date(2023, 6, 3), 20.0),
            Event::new(Category::Merchandise, date(2023, 9, 3), 30.0),
        ];
        let outcome = integrate_detailed(&events, &DecayModel::from(PointEvent), &grid);
        assert_eq!(outcome.series.values(), &[10.0, 20.0]);
        assert_eq!(outcome.placed, 2);
        assert_eq!(outcome.advanced, 1);
        assert_eq!(outcome.excluded, 1);
    }

    #[test]
    fn empty_category_is_all_zero() {
        let grid = TimelineGrid::between(date(2023, 1, 1), date(2023, 3, 31));
        let series = integrate(&[], &DecayModel::from(PointEvent), &grid);
        assert_eq!(series.len(), 3);
        assert!(series.sum().abs() < f64::EPSILON);
    }
}

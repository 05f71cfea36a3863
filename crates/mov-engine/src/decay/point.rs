use chrono::NaiveDate;

use super::{Distribute, usable_magnitude};
use crate::grid::TimelineGrid;
use crate::series::MonthlySeries;

/// The whole magnitude in the month containing the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointEvent;

impl Distribute for PointEvent {
    fn distribute(&self, magnitude: f64, start: NaiveDate, grid: &TimelineGrid) -> MonthlySeries {
        if !usable_magnitude(magnitude) {
            return MonthlySeries::for_grid(grid);
        }
        MonthlySeries::place(grid, start, std::iter::once(magnitude))
    }
}

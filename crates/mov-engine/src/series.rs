//! Grid-aligned monthly value series.

use chrono::NaiveDate;
use mov_types::TrendPoint;
use serde::{Deserialize, Serialize};

use crate::grid::TimelineGrid;
use crate::month::months_between;

/// One value per grid month. Months with no contribution hold `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthlySeries {
    values: Vec<f64>,
}

impl MonthlySeries {
    /// All-zero series of the given length.
    pub fn zeros(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
        }
    }

    /// All-zero series aligned to `grid`.
    pub fn for_grid(grid: &TimelineGrid) -> Self {
        Self::zeros(grid.len())
    }

    /// Wrap raw values.
    pub const fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Number of months.
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series has no months.
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw values in grid order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at `index`, `0.0` when out of range.
    pub fn value_at(&self, index: usize) -> f64 {
        self.values.get(index).copied().unwrap_or(0.0)
    }

    /// Sum over every month.
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Add `value` to the month at `index`. Returns `false` when out of range.
    pub fn add_at(&mut self, index: usize, value: f64) -> bool {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot += value;
                true
            }
            None => false,
        }
    }

    /// Element-wise accumulate `other` into `self`.
    pub fn accumulate(&mut self, other: &Self) {
        for (slot, value) in self.values.iter_mut().zip(&other.values) {
            *slot += value;
        }
    }

    /// Copy with every value multiplied by `weight`.
    pub fn scaled(&self, weight: f64) -> Self {
        Self {
            values: self.values.iter().map(|v| v * weight).collect(),
        }
    }

    /// Lay `shares` onto `grid` starting at the month of `start`.
    ///
    /// Share `t` lands `t` months after `start`. Shares before the first or
    /// after the last grid month are dropped.
    pub fn place<I>(grid: &TimelineGrid, start: NaiveDate, shares: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut series = Self::for_grid(grid);
        let Some(first) = grid.first() else {
            return series;
        };
        let offset = months_between(first, start);
        for (step, share) in shares.into_iter().enumerate() {
            let Ok(step) = i64::try_from(step) else {
                break;
            };
            let Ok(index) = usize::try_from(offset.saturating_add(step)) else {
                continue;
            };
            if !series.add_at(index, share) {
                break;
            }
        }
        series
    }

    /// Left-join trend points onto `grid`.
    ///
    /// Points sharing a month are summed; months without points are zero and
    /// points outside the grid are ignored.
    pub fn from_points(grid: &TimelineGrid, points: &[TrendPoint]) -> Self {
        let mut series = Self::for_grid(grid);
        for point in points {
            if let Some(index) = grid.index_of(point.date) {
                series.add_at(index, point.value);
            }
        }
        series
    }

    /// Trailing rolling mean over `window` months, using whatever is
    /// available at the start of the series.
    #[allow(clippy::cast_precision_loss)]
    pub fn rolling_mean(&self, window: usize) -> Self {
        if window <= 1 {
            return self.clone();
        }
        let mut values = Vec::with_capacity(self.len());
        let mut running = 0.0;
        for (index, value) in self.values.iter().enumerate() {
            running += value;
            if index >= window {
                running -= self.value_at(index.saturating_sub(window));
            }
            let count = index.saturating_add(1).min(window);
            values.push(running / count as f64);
        }
        Self { values }
    }

    /// Iterate values in grid order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn place_offsets_from_grid_start() {
        let grid = TimelineGrid::between(date(2023, 1, 1), date(2023, 4, 1));
        let series = MonthlySeries::place(&grid, date(2023, 3, 15), [1.0, 2.0, 3.0]);
        assert_eq!(series.values(), &[0.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn place_drops_shares_before_grid() {
        let grid = TimelineGrid::between(date(2023, 3, 1), date(2023, 4, 1));
        let series = MonthlySeries::place(&grid, date(2023, 1, 31), [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(series.values(), &[3.0, 4.0]);
    }

    #[test]
    fn from_points_buckets_and_sums() {
        let grid = TimelineGrid::between(date(2023, 1, 1), date(2023, 3, 1));
        let points = [
            TrendPoint::new(date(2023, 1, 3), 2.0),
            TrendPoint::new(date(2023, 1, 20), 3.0),
            TrendPoint::new(date(2023, 3, 31), 7.0),
            TrendPoint::new(date(2024, 3, 31), 9.0),
        ];
        let series = MonthlySeries::from_points(&grid, &points);
        assert_eq!(series.values(), &[5.0, 0.0, 7.0]);
    }

    #[test]
    fn rolling_mean_uses_partial_windows() {
        let series = MonthlySeries::from_values(vec![3.0, 6.0, 9.0, 0.0]);
        let smoothed = series.rolling_mean(3);
        let expected = [3.0, 4.5, 6.0, 5.0];
        for (got, want) in smoothed.iter().zip(expected) {
            assert!(close(got, want), "{got} != {want}");
        }
    }

    #[test]
    fn accumulate_and_scale() {
        let mut a = MonthlySeries::from_values(vec![1.0, 2.0]);
        a.accumulate(&MonthlySeries::from_values(vec![0.5, 0.5]));
        assert_eq!(a.values(), &[1.5, 2.5]);
        assert_eq!(a.scaled(2.0).values(), &[3.0, 5.0]);
        assert!(close(a.sum(), 4.0));
        assert!(close(a.value_at(9), 0.0));
    }
}

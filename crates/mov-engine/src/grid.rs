//! The shared monthly timeline every series is aligned to.

use chrono::NaiveDate;

use crate::month::{add_months, month_end, months_between};

/// Consecutive month-end dates, earliest first, with no gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineGrid {
    months: Vec<NaiveDate>,
}

/// Where an event date lands relative to a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The event's month is inside the grid.
    Exact(NaiveDate),
    /// The event predates the grid and was moved to its first month.
    Advanced(NaiveDate),
    /// The event falls after the last grid month (or the grid is empty).
    OutOfRange,
}

impl TimelineGrid {
    /// A grid with no months.
    pub const fn empty() -> Self {
        Self { months: Vec::new() }
    }

    /// Every month-end from the month of `start` through the month of `end`.
    ///
    /// Empty when `end` precedes `start`.
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        let first = month_end(start);
        let last = month_end(end);
        let mut months = Vec::new();
        let mut current = first;
        while current <= last {
            months.push(current);
            match add_months(current, 1) {
                Some(next) => current = next,
                None => break,
            }
        }
        Self { months }
    }

    /// Grid covering the given dates, optionally stopping at an explicit end.
    ///
    /// The explicit end replaces the latest date; it may extend or truncate.
    pub fn spanning<I>(dates: I, end: Option<NaiveDate>) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
        for date in dates {
            bounds = Some(match bounds {
                None => (date, date),
                Some((lo, hi)) => (lo.min(date), hi.max(date)),
            });
        }
        match bounds {
            Some((lo, hi)) => Self::between(lo, end.unwrap_or(hi)),
            None => Self::empty(),
        }
    }

    /// Number of months.
    pub const fn len(&self) -> usize {
        self.months.len()
    }

    /// Whether the grid has no months.
    pub const fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Month-end dates in order.
    pub fn months(&self) -> &[NaiveDate] {
        &self.months
    }

    /// First month-end, if any.
    pub fn first(&self) -> Option<NaiveDate> {
        self.months.first().copied()
    }

    /// Last month-end, if any.
    pub fn last(&self) -> Option<NaiveDate> {
        self.months.last().copied()
    }

    /// Position of the month containing `date`.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let first = self.first()?;
        let offset = usize::try_from(months_between(first, date)).ok()?;
        (offset < self.len()).then_some(offset)
    }

    /// Month-end anchor for an event dated `date`.
    pub fn anchor(&self, date: NaiveDate) -> Anchor {
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return Anchor::OutOfRange;
        };
        let month = month_end(date);
        if month < first {
            Anchor::Advanced(first)
        } else if month > last {
            Anchor::OutOfRange
        } else {
            Anchor::Exact(month)
        }
    }

    /// Months from the month of `date` through the last grid month, inclusive.
    ///
    /// Zero when `date` is after the grid or the grid is empty.
    pub fn remaining_from(&self, date: NaiveDate) -> u32 {
        let Some(last) = self.last() else {
            return 0;
        };
        let span = months_between(date, last).saturating_add(1);
        u32::try_from(span.max(0)).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    #[test]
    fn between_covers_inclusive_months() {
        let grid = TimelineGrid::between(date(2022, 11, 15), date(2023, 2, 1));
        assert_eq!(
            grid.months(),
            &[
                date(2022, 11, 30),
                date(2022, 12, 31),
                date(2023, 1, 31),
                date(2023, 2, 28)
            ]
        );
    }

    #[test]
    fn spanning_uses_min_and_max() {
        let dates = [date(2023, 3, 10), date(2023, 1, 2), date(2023, 2, 20)];
        let grid = TimelineGrid::spanning(dates, None);
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.first(), Some(date(2023, 1, 31)));
        assert_eq!(grid.last(), Some(date(2023, 3, 31)));
    }

    #[test]
    fn spanning_single_date_is_one_month() {
        let grid = TimelineGrid::spanning([date(2023, 5, 31)], None);
        assert_eq!(grid.months(), &[date(2023, 5, 31)]);
    }

    #[test]
    fn spanning_nothing_is_empty() {
        let grid = TimelineGrid::spanning(Vec::new(), Some(date(2023, 5, 31)));
        assert!(grid.is_empty());
        assert_eq!(grid.first(), None);
    }

    #[test]
    fn explicit_end_extends_and_truncates() {
        let dates = [date(2022, 1, 1), date(2022, 6, 1)];
        assert_eq!(
            TimelineGrid::spanning(dates, Some(date(2022, 12, 1))).len(),
            12
        );
        assert_eq!(TimelineGrid::spanning(dates, Some(date(2022, 3, 1))).len(), 3);
        assert!(TimelineGrid::spanning(dates, Some(date(2021, 3, 1))).is_empty());
    }

    #[test]
    fn anchor_classifies_dates() {
        let grid = TimelineGrid::between(date(2023, 1, 1), date(2023, 6, 1));
        assert_eq!(grid.anchor(date(2023, 3, 4)), Anchor::Exact(date(2023, 3, 31)));
        assert_eq!(
            grid.anchor(date(2022, 7, 4)),
            Anchor::Advanced(date(2023, 1, 31))
        );
        assert_eq!(grid.anchor(date(2023, 7, 1)), Anchor::OutOfRange);
        assert_eq!(TimelineGrid::empty().anchor(date(2023, 1, 1)), Anchor::OutOfRange);
    }

    #[test]
    fn index_and_remaining() {
        let grid = TimelineGrid::between(date(2023, 1, 1), date(2023, 12, 1));
        assert_eq!(grid.index_of(date(2023, 4, 2)), Some(3));
        assert_eq!(grid.index_of(date(2024, 1, 2)), None);
        assert_eq!(grid.index_of(date(2022, 12, 2)), None);
        assert_eq!(grid.remaining_from(date(2023, 1, 31)), 12);
        assert_eq!(grid.remaining_from(date(2023, 12, 31)), 1);
        assert_eq!(grid.remaining_from(date(2024, 2, 1)), 0);
    }
}

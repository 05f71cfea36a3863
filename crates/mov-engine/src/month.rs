//! Month-end calendar arithmetic.
//!
//! The timeline is indexed by month-end dates (`2024-02-29`, `2024-03-31`,
//! ...). Every date entering the engine is bucketed to the last day of its
//! month before comparison, so day-of-month never influences placement.

use chrono::{Datelike, Months, NaiveDate};

/// Last day of the month containing `date`.
///
/// Falls back to `date` itself at the far end of the supported calendar.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Whether `date` is already the last day of its month.
pub fn is_month_end(date: NaiveDate) -> bool {
    month_end(date) == date
}

/// Signed number of calendar months from `from` to `to`.
///
/// Only year and month participate: `2024-01-01` to `2024-03-31` is 2.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let years = i64::from(to.year()).saturating_sub(i64::from(from.year()));
    let months = i64::from(to.month()).saturating_sub(i64::from(from.month()));
    years.saturating_mul(12).saturating_add(months)
}

/// Month-end date `months` months after the month containing `date`.
///
/// Returns `None` past the end of the supported calendar.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let first = date.with_day(1)?;
    first.checked_add_months(Months::new(months)).map(month_end)
}

//! Running totals for reporting.

use crate::series::MonthlySeries;

/// Prefix sum: `out[i] = series[0] + ... + series[i]`.
pub fn cumulative(series: &MonthlySeries) -> MonthlySeries {
    let values = series
        .iter()
        .scan(0.0, |running, value| {
            *running += value;
            Some(*running)
        })
        .collect();
    MonthlySeries::from_values(values)
}

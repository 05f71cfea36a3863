//! Consistency audit for a combined record sequence.
//!
//! The combiner builds every record so that the checks below hold by
//! construction. The audit runs after combination anyway and reports any
//! violation as a [`ValuationAnomaly`], the valuation equivalent of a
//! ledger imbalance. Anomalies never abort a run.
//!
//! For every record:
//!
//! ```text
//! date is a month-end, strictly after the previous record's date
//! every component is finite and >= 0
//! total == fan_value + portfolio_value + live_content_value + management_value
//! cumulative_total == previous cumulative_total + total
//! ```

use chrono::NaiveDate;
use mov_types::AggregateRecord;
use serde::{Deserialize, Serialize};

use crate::month::is_month_end;
use crate::series::MonthlySeries;

/// Relative tolerance for floating-point identities.
pub const RELATIVE_TOLERANCE: f64 = 1e-9;

/// The result of auditing a record sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuditResult {
    /// Every check passed.
    Balanced,
    /// At least one check failed.
    Anomaly(ValuationAnomaly),
}

impl AuditResult {
    /// Whether every check passed.
    pub const fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// All issues found in one sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationAnomaly {
    /// Individual violations in record order.
    pub issues: Vec<AuditIssue>,
    /// One-line summary for logs.
    pub message: String,
}

/// A single violated check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditIssue {
    /// Record date is not the last day of its month.
    NotMonthEnd {
        /// Offending date.
        date: NaiveDate,
    },
    /// Record date does not follow the previous record's date.
    OutOfOrder {
        /// Offending date.
        date: NaiveDate,
    },
    /// A component is negative or not finite.
    InvalidComponent {
        /// Month of the record.
        date: NaiveDate,
        /// Field name.
        field: String,
        /// Offending value.
        value: f64,
    },
    /// `total` differs from the sum of the aggregates.
    TotalMismatch {
        /// Month of the record.
        date: NaiveDate,
        /// Sum of the aggregates.
        expected: f64,
        /// Stored total.
        actual: f64,
    },
    /// `cumulative_total` differs from the running sum of totals.
    CumulativeMismatch {
        /// Month of the record.
        date: NaiveDate,
        /// Running sum of totals.
        expected: f64,
        /// Stored cumulative total.
        actual: f64,
    },
}

/// Whether `a` and `b` agree within [`RELATIVE_TOLERANCE`].
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= RELATIVE_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// Whether `distributed` sums to `magnitude` within `relative_tolerance`.
pub fn is_conserved(distributed: &MonthlySeries, magnitude: f64, relative_tolerance: f64) -> bool {
    let scale = magnitude.abs().max(f64::MIN_POSITIVE);
    (distributed.sum() - magnitude).abs() / scale <= relative_tolerance
}

/// Check every record in `records`.
pub fn verify_records(records: &[AggregateRecord]) -> AuditResult {
    let mut issues = Vec::new();
    let mut previous: Option<NaiveDate> = None;
    let mut running = 0.0;

    for r in records {
        if !is_month_end(r.date) {
            issues.push(AuditIssue::NotMonthEnd { date: r.date });
        }
        if previous.is_some_and(|p| r.date <= p) {
            issues.push(AuditIssue::OutOfOrder { date: r.date });
        }
        previous = Some(r.date);

        let aggregates = [
            ("portfolio_value", r.portfolio_value),
            ("live_content_value", r.live_content_value),
            ("management_value", r.management_value),
            ("total", r.total),
            ("cumulative_total", r.cumulative_total),
        ];
        for (field, value) in r.components().into_iter().chain(aggregates) {
            if !value.is_finite() || value < 0.0 {
                issues.push(AuditIssue::InvalidComponent {
                    date: r.date,
                    field: field.to_owned(),
                    value,
                });
            }
        }

        let expected = r.fan_value + r.portfolio_value + r.live_content_value + r.management_value;
        if !approx_eq(expected, r.total) {
            issues.push(AuditIssue::TotalMismatch {
                date: r.date,
                expected,
                actual: r.total,
            });
        }

        running += r.total;
        if !approx_eq(running, r.cumulative_total) {
            issues.push(AuditIssue::CumulativeMismatch {
                date: r.date,
                expected: running,
                actual: r.cumulative_total,
            });
        }
    }

    if issues.is_empty() {
        AuditResult::Balanced
    } else {
        let message = format!(
            "{} audit issue(s) across {} record(s)",
            issues.len(),
            records.len()
        );
        AuditResult::Anomaly(ValuationAnomaly { issues, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(y: i32, m: u32, d: u32, total: f64, cumulative: f64) -> AggregateRecord {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        let mut r = AggregateRecord::zero(date);
        r.fan_value = total;
        r.total = total;
        r.cumulative_total = cumulative;
        r
    }

    #[test]
    fn consistent_sequence_is_balanced() {
        let records = [record(2023, 1, 31, 2.0, 2.0), record(2023, 2, 28, 3.0, 5.0)];
        assert!(verify_records(&records).is_balanced());
        assert!(verify_records(&[]).is_balanced());
    }

    #[test]
    fn reports_each_violation() {
        let mut broken = record(2023, 2, 27, 3.0, 4.0);
        broken.merchandise = -1.0;
        let records = [record(2023, 3, 31, 2.0, 2.0), broken];
        let AuditResult::Anomaly(anomaly) = verify_records(&records) else {
            panic!("expected an anomaly");
        };
        let kinds: Vec<&str> = anomaly
            .issues
            .iter()
            .map(|i| match i {
                AuditIssue::NotMonthEnd { .. } => "not_month_end",
                AuditIssue::OutOfOrder { .. } => "out_of_order",
                AuditIssue::InvalidComponent { .. } => "invalid_component",
                AuditIssue::TotalMismatch { .. } => "total_mismatch",
                AuditIssue::CumulativeMismatch { .. } => "cumulative_mismatch",
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "not_month_end",
                "out_of_order",
                "invalid_component",
                "cumulative_mismatch"
            ]
        );
    }

    #[test]
    fn conservation_check_uses_relative_error() {
        let series = MonthlySeries::from_values(vec![499_999.9999, 0.0]);
        assert!(is_conserved(&series, 500_000.0, 1e-6));
        assert!(!is_conserved(&series, 600_000.0, 1e-6));
    }
}

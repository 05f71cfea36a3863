//! Integration tests for the valuation pipeline.
//!
//! Drive full runs from JSON input documents and YAML configs, the way the
//! runner and other collaborators use the crate.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::missing_panics_doc
)]

use std::io::Write;

use mov_core::{SpanPolicy, ValuationConfig, ValuationPipeline};
use mov_types::{Category, ValuationInput};

fn input(json: &str) -> ValuationInput {
    serde_json::from_str(json).expect("valid input document")
}

fn default_pipeline() -> ValuationPipeline {
    ValuationPipeline::new(ValuationConfig::default()).expect("default config is valid")
}

const MIXED: &str = r#"{
    "artist": "artist-07",
    "events": {
        "streaming": [{"date": "2021-02-14", "magnitude": 250000, "tag": "album-1"}],
        "retail": [{"date": "2021.03.02.", "magnitude": 12000}],
        "concert": [
            {"date": "2021-06-12", "magnitude": 2000000, "window_end": "2021-06-13"},
            {"date": "2021-10-01", "magnitude": 400000}
        ],
        "social_youtube": [{"date": "2021-04-01T09:00:00Z", "magnitude": 5000}],
        "merchandise": [{"date": "2021/12/24", "magnitude": 300}],
        "broadcast": [{"date": "garbage", "magnitude": 10}, {"date": "2022-01-05", "magnitude": 20000}]
    },
    "fan_value_trend": [
        {"date": "2020-12-01", "value": 10},
        {"date": "2021-05-01", "value": 30},
        {"date": "2021-05-20", "value": 12}
    ],
    "management_value": [{"date": "2021-08-31", "value": 700}]
}"#;

#[test]
fn mixed_document_produces_audited_records() {
    let report = default_pipeline().run(&input(MIXED));

    assert_eq!(report.artist, "artist-07");
    assert_eq!(report.records.len(), 12);
    assert_eq!(report.start().unwrap().to_string(), "2021-02-28");
    assert_eq!(report.end().unwrap().to_string(), "2022-01-31");
    assert!(report.audit.is_balanced());
    assert_eq!(report.dropped_events.invalid_date, 1);

    // Fan trend points outside the event span do not widen the timeline,
    // and same-month points are summed.
    let may = report
        .records
        .iter()
        .find(|r| r.date.to_string() == "2021-05-31")
        .unwrap();
    assert!((may.fan_value - 42.0).abs() < 1e-9);

    let merch_total: f64 = report.records.iter().map(|r| r.merchandise).sum();
    assert!((merch_total - 210.0).abs() < 1e-9);

    let sum: f64 = report.records.iter().map(|r| r.total).sum();
    assert!((report.final_value() - sum).abs() <= 1e-9 * sum);
}

#[test]
fn trend_span_policy_widens_the_timeline() {
    let config = ValuationConfig {
        timeline: mov_core::config::TimelineConfig {
            span: SpanPolicy::EventsAndTrends,
            end_date: None,
        },
        ..ValuationConfig::default()
    };
    let report = ValuationPipeline::new(config).unwrap().run(&input(MIXED));
    assert_eq!(report.start().unwrap().to_string(), "2020-12-31");
    assert_eq!(report.records.len(), 14);
    assert!((report.records[0].fan_value - 10.0).abs() < 1e-9);
    // Streaming starts two months in.
    assert!(report.records[1].streaming.abs() < f64::EPSILON);
    assert!(report.records[2].streaming > 0.0);
}

#[test]
fn empty_document_is_an_empty_report() {
    let report = default_pipeline().run(&input("{}"));
    assert!(report.is_empty());
    assert!(report.final_value().abs() < f64::EPSILON);
    assert!(report.audit.is_balanced());
    assert_eq!(report.artist, "unknown");
}

#[test]
fn late_events_are_excluded_by_explicit_end() {
    let doc = r#"{
        "end_date": "2023-03-31",
        "events": {
            "merchandise": [
                {"date": "2023-01-15", "magnitude": 100},
                {"date": "2023-06-15", "magnitude": 100}
            ]
        }
    }"#;
    let report = default_pipeline().run(&input(doc));
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.excluded_events, 1);
    assert!((report.final_value() - 70.0).abs() < 1e-9);
}

#[test]
fn sequential_and_job_runs_agree() {
    let pipeline = default_pipeline();
    let doc = input(MIXED);
    let sequential = pipeline.run(&doc);

    let prepared = pipeline.prepare(&doc);
    let mut jobs = prepared.jobs();
    jobs.reverse();
    let integrations = jobs.into_iter().map(mov_core::CategoryJob::run).collect();
    let from_jobs = prepared.finish(integrations);

    assert_eq!(sequential.records, from_jobs.records);
    assert_eq!(sequential.category_totals, from_jobs.category_totals);
}

#[test]
fn report_round_trips_through_json() {
    let report = default_pipeline().run(&input(MIXED));
    let json = serde_json::to_string(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["records"][0]["date"], "2021-02-28");
    assert_eq!(value["audit"]["status"], "balanced");
    assert!(value["category_totals"]["streaming"].as_f64().unwrap() > 0.0);
    assert!(report.category_totals.contains_key(&Category::Broadcast));
}

#[test]
fn malformed_records_drop_alone() {
    let doc = r#"{
        "events": {
            "retail": [
                {"date": 1685491200000, "magnitude": 5},
                {"date": "2023-05-31", "magnitude": null},
                {"date": "2023-05-31", "magnitude": "n/a"},
                {"date": "2023-05-31", "magnitude": 1000}
            ],
            "podcast": [{"date": "2023-05-31", "magnitude": 50}]
        },
        "fan_value_trend": [
            {"date": "2023-05-31", "value": null},
            {"date": {"y": 2023}, "value": 4}
        ]
    }"#;
    let report = default_pipeline().run(&input(doc));

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.start().unwrap().to_string(), "2023-05-31");
    assert_eq!(report.dropped_events.invalid_date, 1);
    assert_eq!(report.dropped_events.invalid_magnitude, 2);
    assert_eq!(report.dropped_events.unknown_category, 1);
    assert_eq!(report.dropped_events.invalid_trend_points, 2);
    assert!(report.audit.is_balanced());
    assert!(report.records[0].retail > 0.0);
    assert!(report.records[0].fan_value.abs() < f64::EPSILON);
}

#[test]
fn numeric_end_date_is_ignored() {
    let doc = r#"{
        "end_date": 20231231,
        "events": {"merchandise": [{"date": "2023-01-15", "magnitude": 100}]}
    }"#;
    let report = default_pipeline().run(&input(doc));
    assert_eq!(report.records.len(), 1);
    assert!((report.final_value() - 70.0).abs() < 1e-9);
}

#[test]
fn config_file_changes_weights() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "weights:\n  merchandise: 2.0\n").unwrap();
    let config = ValuationConfig::from_file(file.path()).unwrap();
    let report = ValuationPipeline::new(config)
        .unwrap()
        .run(&input(r#"{"events": {"merchandise": [{"date": "2023-05-31", "magnitude": 300}]}}"#));
    assert!((report.final_value() - 600.0).abs() < 1e-9);
}

//! The valuation pipeline: normalize, build the grid, integrate every
//! category, combine, audit.
//!
//! A run is split into [`ValuationPipeline::prepare`], a set of independent
//! [`CategoryJob`]s, and [`PreparedRun::finish`]. The jobs own their data,
//! so a caller may execute them on worker threads; [`ValuationPipeline::run`]
//! simply executes them in order. Either way the combination step waits for
//! every category.

use std::collections::BTreeMap;

use chrono::Utc;
use mov_engine::{
    AuditResult, CategorySeries, DecayModel, ExternalSeries, Integration, MonthlySeries,
    TimelineGrid, WeightTable, combine, integrate_detailed, verify_records,
};
use mov_types::{Category, Event, RunId, ValuationInput};
use tracing::{error, info};

use crate::config::{ConfigError, SpanPolicy, ValuationConfig};
use crate::input::{DroppedEvents, NormalizedInput, normalize};
use crate::report::ValuationReport;

/// Errors that prevent a pipeline from being built.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The configuration is invalid.
    #[error("invalid valuation config: {0}")]
    Config(#[from] ConfigError),

    /// A category has no decay model assigned.
    #[error("no decay model configured for category {0}")]
    MissingModel(Category),
}

/// A validated configuration ready to value any number of inputs.
#[derive(Debug, Clone)]
pub struct ValuationPipeline {
    config: ValuationConfig,
    models: BTreeMap<Category, DecayModel>,
}

impl ValuationPipeline {
    /// Validate `config` and build the decay models once.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] for invalid weights or decay
    /// parameters.
    pub fn new(config: ValuationConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let models = config.models()?;
        if let Some(missing) = Category::ALL.iter().find(|c| !models.contains_key(*c)) {
            return Err(PipelineError::MissingModel(*missing));
        }
        Ok(Self { config, models })
    }

    /// The configuration in use.
    pub const fn config(&self) -> &ValuationConfig {
        &self.config
    }

    /// Normalize `input`, build the timeline, and split the run into jobs.
    pub fn prepare(&self, input: &ValuationInput) -> PreparedRun {
        let normalized = normalize(input);
        let end = normalized.end_date.or(self.config.timeline.end_date);
        let grid = match self.config.timeline.span {
            SpanPolicy::Events => TimelineGrid::spanning(normalized.event_dates(), end),
            SpanPolicy::EventsAndTrends => TimelineGrid::spanning(
                normalized.event_dates().chain(normalized.trend_dates()),
                end,
            ),
        };
        let external = self.external_series(&grid, &normalized);

        info!(
            artist = %normalized.artist,
            events = normalized.event_dates().count(),
            months = grid.len(),
            start = ?grid.first(),
            end = ?grid.last(),
            "Valuation run prepared"
        );

        let NormalizedInput {
            artist,
            events,
            dropped,
            ..
        } = normalized;

        PreparedRun {
            run_id: RunId::new(),
            artist,
            grid,
            events,
            models: self.models.clone(),
            external,
            weights: self.config.weights,
            dropped,
        }
    }

    /// Value `input` on the calling thread.
    pub fn run(&self, input: &ValuationInput) -> ValuationReport {
        let prepared = self.prepare(input);
        let integrations = prepared.jobs().into_iter().map(CategoryJob::run).collect();
        prepared.finish(integrations)
    }

    fn external_series(&self, grid: &TimelineGrid, input: &NormalizedInput) -> ExternalSeries {
        let mut external =
            ExternalSeries::from_points(grid, &input.fan_value_trend, &input.management_value);
        if let Some(window) = self.config.fan_value.smoothing_window {
            external.fan_value = external.fan_value.rolling_mean(window);
        }
        external
    }
}

/// Integration work for one category. Owns everything it needs.
#[derive(Debug, Clone)]
pub struct CategoryJob {
    /// Category being integrated.
    pub category: Category,
    events: Vec<Event>,
    model: DecayModel,
    grid: TimelineGrid,
}

impl CategoryJob {
    /// Number of events in this job.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Integrate the category.
    pub fn run(self) -> (Category, Integration) {
        let outcome = integrate_detailed(&self.events, &self.model, &self.grid);
        (self.category, outcome)
    }
}

/// A normalized run waiting for its category integrations.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    run_id: RunId,
    artist: String,
    grid: TimelineGrid,
    events: BTreeMap<Category, Vec<Event>>,
    models: BTreeMap<Category, DecayModel>,
    external: ExternalSeries,
    weights: WeightTable,
    dropped: DroppedEvents,
}

impl PreparedRun {
    /// Identifier the report will carry.
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Artist being valued.
    pub fn artist(&self) -> &str {
        &self.artist
    }

    /// One job per category, empty categories included.
    pub fn jobs(&self) -> Vec<CategoryJob> {
        self.models
            .iter()
            .map(|(category, model)| CategoryJob {
                category: *category,
                events: self.events.get(category).cloned().unwrap_or_default(),
                model: model.clone(),
                grid: self.grid.clone(),
            })
            .collect()
    }

    /// Combine finished integrations into the report.
    ///
    /// Categories missing from `integrations` count as all-zero.
    pub fn finish(self, integrations: Vec<(Category, Integration)>) -> ValuationReport {
        let mut categories = CategorySeries::new();
        let mut excluded = 0_usize;
        let mut advanced = 0_usize;
        for (category, integration) in integrations {
            excluded = excluded.saturating_add(integration.excluded);
            advanced = advanced.saturating_add(integration.advanced);
            categories.insert(category, integration.series);
        }
        for category in Category::ALL {
            if categories.get(category).is_none() {
                categories.insert(category, MonthlySeries::for_grid(&self.grid));
            }
        }

        let records = combine(&self.grid, &categories, &self.external, &self.weights);
        let audit = verify_records(&records);
        if let AuditResult::Anomaly(anomaly) = &audit {
            error!(
                artist = %self.artist,
                run_id = %self.run_id,
                issues = anomaly.issues.len(),
                message = %anomaly.message,
                "Valuation audit failed"
            );
        }

        let report = ValuationReport {
            run_id: self.run_id,
            artist: self.artist,
            generated_at: Utc::now(),
            records,
            category_totals: categories.totals(),
            weights: self.weights,
            dropped_events: self.dropped,
            excluded_events: excluded,
            advanced_events: advanced,
            audit,
        };
        info!(
            artist = %report.artist,
            run_id = %report.run_id,
            months = report.records.len(),
            final_value = report.final_value(),
            dropped = report.dropped_events.events(),
            excluded = report.excluded_events,
            "Valuation run finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mov_types::RawEvent;

    fn input_with(category: Category, dates: &[(&str, f64)]) -> ValuationInput {
        let mut input = ValuationInput {
            artist: Some("artist-01".to_owned()),
            ..ValuationInput::default()
        };
        input.events.insert(
            category.as_str().to_owned(),
            dates
                .iter()
                .map(|(date, magnitude)| RawEvent {
                    date: Some((*date).to_owned()),
                    magnitude: Some(*magnitude),
                    ..RawEvent::default()
                })
                .collect(),
        );
        input
    }

    fn pipeline() -> Option<ValuationPipeline> {
        ValuationPipeline::new(ValuationConfig::default()).ok()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = ValuationConfig::default();
        config.social.peak_month = 0;
        assert!(matches!(
            ValuationPipeline::new(config),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn jobs_cover_every_category() {
        let Some(pipeline) = pipeline() else {
            panic!("default config must build");
        };
        let prepared = pipeline.prepare(&input_with(Category::Retail, &[("2022-01-31", 1.0)]));
        let jobs = prepared.jobs();
        assert_eq!(jobs.len(), Category::ALL.len());
        let retail: usize = jobs
            .iter()
            .filter(|j| j.category == Category::Retail)
            .map(CategoryJob::event_count)
            .sum();
        assert_eq!(retail, 1);
    }

    #[test]
    fn explicit_end_date_extends_timeline() {
        let Some(pipeline) = pipeline() else {
            panic!("default config must build");
        };
        let mut input = input_with(Category::Merchandise, &[("2023-05-02", 300.0)]);
        input.end_date = Some("2023-08-15".to_owned());
        let report = pipeline.run(&input);
        assert_eq!(report.records.len(), 4);
        assert!((report.final_value() - 210.0).abs() < 1e-9);
    }

    #[test]
    fn finish_tolerates_missing_integrations() {
        let Some(pipeline) = pipeline() else {
            panic!("default config must build");
        };
        let prepared = pipeline.prepare(&input_with(Category::Merchandise, &[("2023-05-31", 300.0)]));
        let report = prepared.finish(Vec::new());
        assert_eq!(report.records.len(), 1);
        assert!(report.final_value().abs() < f64::EPSILON);
        assert!(report.audit.is_balanced());
    }
}

//! Concurrent category integration.
//!
//! Every category is integrated on its own blocking worker; the combine
//! step waits until all workers have joined. Results are identical to the
//! sequential `ValuationPipeline::run`.

use futures::future::join_all;
use mov_core::{ValuationPipeline, ValuationReport};
use mov_types::ValuationInput;
use tracing::{debug, info};

use crate::error::RunnerError;

/// Runs valuations with one blocking task per category.
#[derive(Debug, Clone)]
pub struct ValuationRunner {
    pipeline: ValuationPipeline,
}

impl ValuationRunner {
    /// Wrap a validated pipeline.
    pub const fn new(pipeline: ValuationPipeline) -> Self {
        Self { pipeline }
    }

    /// Value `input`, integrating categories concurrently.
    pub async fn run(&self, input: &ValuationInput) -> Result<ValuationReport, RunnerError> {
        let prepared = self.pipeline.prepare(input);
        let jobs = prepared.jobs();
        info!(
            run_id = %prepared.run_id(),
            artist = prepared.artist(),
            workers = jobs.len(),
            "Dispatching category workers"
        );

        let handles = jobs.into_iter().map(|job| {
            debug!(category = %job.category, events = job.event_count(), "Spawning worker");
            tokio::task::spawn_blocking(move || job.run())
        });

        let mut integrations = Vec::new();
        for joined in join_all(handles).await {
            let (category, integration) =
                joined.map_err(|e| RunnerError::Worker(e.to_string()))?;
            debug!(
                category = %category,
                placed = integration.placed,
                excluded = integration.excluded,
                "Worker finished"
            );
            integrations.push((category, integration));
        }

        Ok(prepared.finish(integrations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mov_core::ValuationConfig;

    const DOC: &str = r#"{
        "artist": "artist-03",
        "events": {
            "streaming": [{"date": "2022-01-10", "magnitude": 90000}],
            "retail": [{"date": "2022-02-01", "magnitude": 4000}],
            "concert": [{"date": "2022-05-21", "magnitude": 1500000}],
            "social_twitter": [{"date": "2022-03-03", "magnitude": 2}],
            "merchandise": [{"date": "2022-12-24", "magnitude": 300}]
        },
        "fan_value_trend": [{"date": "2022-06-30", "value": 55}]
    }"#;

    #[tokio::test]
    async fn concurrent_run_matches_sequential() {
        let Ok(input) = serde_json::from_str::<ValuationInput>(DOC) else {
            panic!("input document");
        };
        let Ok(pipeline) = ValuationPipeline::new(ValuationConfig::default()) else {
            panic!("default config");
        };
        let sequential = pipeline.run(&input);
        let runner = ValuationRunner::new(pipeline);
        let Ok(concurrent) = runner.run(&input).await else {
            panic!("concurrent run failed");
        };

        assert_eq!(concurrent.records.len(), 12);
        assert_eq!(concurrent.records, sequential.records);
        assert_eq!(concurrent.category_totals, sequential.category_totals);
        assert!(concurrent.audit.is_balanced());
    }

    #[tokio::test]
    async fn empty_input_runs_cleanly() {
        let Ok(pipeline) = ValuationPipeline::new(ValuationConfig::default()) else {
            panic!("default config");
        };
        let report = ValuationRunner::new(pipeline)
            .run(&ValuationInput::default())
            .await
            .ok();
        assert_eq!(report.map(|r| r.records.len()), Some(0));
    }
}

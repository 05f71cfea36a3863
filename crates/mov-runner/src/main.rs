//! Valuation runner entry point for the MOV engine.
//!
//! The runner is the collaborator that feeds the pure valuation engine. It
//! reads an input document produced by the collectors, returns a cached
//! report when one is still fresh, and otherwise runs the pipeline with one
//! blocking worker per category before writing the report as JSON.
//!
//! # Architecture
//!
//! ```text
//! input JSON --> cache lookup --(miss)--> prepare --> category workers --> combine --> report JSON
//!                     |                                                        |
//!                     +-------------------(hit)---------------------------------+
//! ```

mod cache;
mod config;
mod error;
mod runner;

use chrono::Utc;
use mov_core::{ValuationConfig, ValuationPipeline, ValuationReport, input::UNKNOWN_ARTIST};
use mov_types::ValuationInput;
use tokio::io::AsyncWriteExt as _;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cache::ReportCache;
use crate::config::{LogFormat, RunnerConfig};
use crate::error::RunnerError;
use crate::runner::ValuationRunner;

/// Application entry point.
///
/// Initializes logging, loads configuration from environment variables,
/// resolves the report (cache or fresh run), and writes it out.
///
/// # Errors
///
/// Returns an error if configuration, input, or output handling fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LogFormat::from_env());

    info!("mov-runner starting");

    let config = RunnerConfig::from_env()?;
    info!(
        input = %config.input_path.display(),
        config = ?config.config_path,
        cache_dir = ?config.cache_dir,
        cache_ttl_secs = config.cache_ttl.as_secs(),
        "configuration loaded"
    );

    let valuation_config = match &config.config_path {
        Some(path) => ValuationConfig::from_file(path)?,
        None => ValuationConfig::default(),
    };
    let pipeline = ValuationPipeline::new(valuation_config)?;

    let raw = tokio::fs::read_to_string(&config.input_path)
        .await
        .map_err(|e| RunnerError::io(&config.input_path, e))?;
    let input: ValuationInput = serde_json::from_str(&raw)?;
    info!(
        artist = input.artist.as_deref().unwrap_or(UNKNOWN_ARTIST),
        events = input.event_count(),
        "input loaded"
    );

    let report = resolve_report(&config, pipeline, &input).await?;
    write_report(&config, &report).await?;

    info!(
        run_id = %report.run_id,
        months = report.records.len(),
        final_value = report.final_value(),
        "mov-runner finished"
    );
    Ok(())
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

/// Fresh cached report, or a new run (cached afterwards when enabled).
async fn resolve_report(
    config: &RunnerConfig,
    pipeline: ValuationPipeline,
    input: &ValuationInput,
) -> Result<ValuationReport, RunnerError> {
    let artist = input
        .artist
        .as_deref()
        .filter(|a| !a.trim().is_empty())
        .unwrap_or(UNKNOWN_ARTIST);
    let cache = config
        .cache_dir
        .as_ref()
        .map(|dir| ReportCache::new(dir, config.cache_ttl));

    if let Some(cache) = &cache {
        if let Some(report) = cache.load(artist, &config.cache_scope, Utc::now()).await? {
            info!(
                artist,
                cache_dir = %cache.dir().display(),
                generated_at = %report.generated_at,
                "returning cached report"
            );
            return Ok(report);
        }
    }

    let report = ValuationRunner::new(pipeline).run(input).await?;

    if let Some(cache) = &cache {
        let path = cache.store(artist, &config.cache_scope, &report).await?;
        info!(path = %path.display(), "report cached");
    }
    Ok(report)
}

async fn write_report(config: &RunnerConfig, report: &ValuationReport) -> Result<(), RunnerError> {
    let json = serde_json::to_vec_pretty(report)?;
    match &config.output_path {
        Some(path) => tokio::fs::write(path, &json)
            .await
            .map_err(|e| RunnerError::io(path, e)),
        None => {
            let mut stdout = tokio::io::stdout();
            let written = async {
                stdout.write_all(&json).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
                Ok::<(), std::io::Error>(())
            }
            .await;
            written.map_err(|e| RunnerError::io(std::path::Path::new("<stdout>"), e))
        }
    }
}

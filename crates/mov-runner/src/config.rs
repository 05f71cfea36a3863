//! Configuration types for the valuation runner.
//!
//! All runner settings are loaded from environment variables. The valuation
//! parameters themselves live in the YAML file named by `MOV_CONFIG`.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::RunnerError;

/// Default cache freshness: one day.
const DEFAULT_CACHE_TTL_HOURS: u64 = 24;

/// Complete runner configuration loaded from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Input JSON document.
    pub input_path: PathBuf,
    /// Valuation YAML config; built-in defaults when absent.
    pub config_path: Option<PathBuf>,
    /// Report destination; stdout when absent.
    pub output_path: Option<PathBuf>,
    /// Report cache directory; caching is off when absent.
    pub cache_dir: Option<PathBuf>,
    /// How long a cached report stays fresh.
    pub cache_ttl: Duration,
    /// Cache key scope combined with the artist.
    pub cache_scope: String,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Read `MOV_LOG_FORMAT` (`json` or anything else for pretty).
    pub fn from_env() -> Self {
        Self::parse(std::env::var("MOV_LOG_FORMAT").ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

impl RunnerConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `MOV_INPUT` -- path to the input JSON document
    ///
    /// Optional variables:
    /// - `MOV_CONFIG` -- path to the valuation YAML config
    /// - `MOV_OUTPUT` -- report output path (default stdout)
    /// - `MOV_CACHE_DIR` -- report cache directory (default: no cache)
    /// - `MOV_CACHE_TTL_HOURS` -- cache freshness in hours (default 24)
    /// - `MOV_CACHE_SCOPE` -- cache key scope (default `mov`)
    pub fn from_env() -> Result<Self, RunnerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RunnerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let input_path = non_empty("MOV_INPUT")
            .map(PathBuf::from)
            .ok_or_else(|| RunnerError::Config("missing env var: MOV_INPUT".to_owned()))?;

        let cache_ttl_hours: u64 = non_empty("MOV_CACHE_TTL_HOURS")
            .unwrap_or_else(|| DEFAULT_CACHE_TTL_HOURS.to_string())
            .trim()
            .parse()
            .map_err(|e| RunnerError::Config(format!("invalid MOV_CACHE_TTL_HOURS: {e}")))?;

        Ok(Self {
            input_path,
            config_path: non_empty("MOV_CONFIG").map(PathBuf::from),
            output_path: non_empty("MOV_OUTPUT").map(PathBuf::from),
            cache_dir: non_empty("MOV_CACHE_DIR").map(PathBuf::from),
            cache_ttl: Duration::from_secs(cache_ttl_hours.saturating_mul(3600)),
            cache_scope: non_empty("MOV_CACHE_SCOPE").unwrap_or_else(|| "mov".to_owned()),
        })
    }
}

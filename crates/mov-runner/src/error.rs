//! Error types for the valuation runner.
//!
//! Uses `thiserror` for typed errors that surface through the runner:
//! environment configuration, file I/O, JSON documents, the pipeline, and
//! the blocking workers.

use mov_core::{ConfigError, PipelineError};

/// Errors that can occur during a runner invocation.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// The valuation config file could not be loaded.
    #[error(transparent)]
    ValuationConfig(#[from] ConfigError),

    /// The pipeline rejected the configuration.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being accessed.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A category worker panicked or was cancelled.
    #[error("category worker failed: {0}")]
    Worker(String),
}

impl RunnerError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

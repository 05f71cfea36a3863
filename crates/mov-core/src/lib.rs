//! Valuation pipeline for the MOV engine.
//!
//! Wraps the pure engine with everything a run needs around it: a typed
//! configuration loaded from YAML, normalization of raw collaborator
//! documents, and a pipeline that produces a [`ValuationReport`].
//!
//! # Modules
//!
//! - [`config`] -- `ValuationConfig` and its sections
//! - [`input`] -- Date parsing and raw input normalization
//! - [`pipeline`] -- Grid, integration jobs, combination, audit
//! - [`report`] -- The report handed back to collaborators

pub mod config;
pub mod input;
pub mod pipeline;
pub mod report;

pub use config::{ConfigError, SpanPolicy, ValuationConfig};
pub use input::{DroppedEvents, NormalizedInput, normalize, parse_event_date};
pub use pipeline::{CategoryJob, PipelineError, PreparedRun, ValuationPipeline};
pub use report::ValuationReport;

//! Configuration loading and typed config structures for the valuation run.
//!
//! The canonical configuration lives in `mov-config.yaml` at the project
//! root. Every field has a default equal to the calibration the valuation
//! pipeline has always used, so an empty document is a valid config.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use mov_engine::{
    DecayError, DecayModel, MagnitudeScaledWindowDecay, NormalizedExponentialDecay,
    PhaseSchedule, PiecewisePhaseDecay, PointEvent, TriangularRampDecay, WeightError,
    WeightTable,
};
use mov_types::Category;
use serde::{Deserialize, Serialize};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A weight is negative or not finite.
    #[error(transparent)]
    Weight(#[from] WeightError),

    /// A decay model parameter is out of range.
    #[error(transparent)]
    Decay(#[from] DecayError),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level valuation configuration.
///
/// Mirrors the structure of `mov-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationConfig {
    /// Combination weights.
    #[serde(default)]
    pub weights: WeightTable,

    /// Streaming release decay.
    #[serde(default)]
    pub streaming: ExponentialConfig,

    /// Popularity release decay.
    #[serde(default)]
    pub popularity: ExponentialConfig,

    /// Physical retail decay schedule.
    #[serde(default)]
    pub retail: PhaseConfig,

    /// Concert influence window.
    #[serde(default)]
    pub concert: WindowConfig,

    /// Broadcast appearance influence window.
    #[serde(default)]
    pub broadcast_decay: WindowConfig,

    /// Social post engagement ramp, shared by every platform.
    #[serde(default)]
    pub social: RampConfig,

    /// Timeline span policy.
    #[serde(default)]
    pub timeline: TimelineConfig,

    /// Fan value trend handling.
    #[serde(default)]
    pub fan_value: FanValueConfig,
}

impl ValuationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Check weights and every decay parameter.
    ///
    /// # Errors
    ///
    /// Returns the first invalid weight or decay parameter found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.models()?;
        Ok(())
    }

    /// The decay model assigned to each category.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Decay`] if a model section is out of range.
    pub fn models(&self) -> Result<BTreeMap<Category, DecayModel>, ConfigError> {
        let social: DecayModel = self.social.model()?.into();
        let mut models = BTreeMap::new();
        models.insert(Category::Streaming, self.streaming.model()?.into());
        models.insert(Category::Popularity, self.popularity.model()?.into());
        models.insert(Category::Retail, self.retail.model()?.into());
        models.insert(Category::Concert, self.concert.model()?.into());
        models.insert(Category::SocialTwitter, social.clone());
        models.insert(Category::SocialYoutube, social.clone());
        models.insert(Category::SocialInstagram, social);
        models.insert(Category::Merchandise, PointEvent.into());
        models.insert(Category::Broadcast, self.broadcast_decay.model()?.into());
        Ok(models)
    }
}

// ---------------------------------------------------------------------------
// Decay sections
// ---------------------------------------------------------------------------

/// Parameters for a normalized exponential decay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExponentialConfig {
    /// Fraction of the initial share left at the end of the horizon.
    #[serde(default = "default_residual_rate")]
    pub residual_rate: f64,

    /// Horizon the magnitude is conserved over, in months.
    #[serde(default = "default_horizon_months")]
    pub horizon_months: u32,

    /// Extra factor on the decay constant (catalogue ageing).
    #[serde(default = "default_rate_multiplier")]
    pub rate_multiplier: f64,
}

impl Default for ExponentialConfig {
    fn default() -> Self {
        Self {
            residual_rate: default_residual_rate(),
            horizon_months: default_horizon_months(),
            rate_multiplier: default_rate_multiplier(),
        }
    }
}

impl ExponentialConfig {
    /// Build the model.
    ///
    /// # Errors
    ///
    /// Returns [`DecayError`] for an out-of-range parameter.
    pub fn model(&self) -> Result<NormalizedExponentialDecay, DecayError> {
        NormalizedExponentialDecay::new(self.residual_rate, self.horizon_months)?
            .with_rate_multiplier(self.rate_multiplier)
    }
}

/// Parameters for the three-phase retail schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseConfig {
    /// Rate in the release month.
    #[serde(default = "default_initial_start")]
    pub initial_start: f64,

    /// Rate at the end of the initial phase.
    #[serde(default = "default_initial_end")]
    pub initial_end: f64,

    /// Length of the initial phase.
    #[serde(default = "default_initial_months")]
    pub initial_months: u32,

    /// Rate at the end of the middle phase.
    #[serde(default = "default_middle_end")]
    pub middle_end: f64,

    /// Length of the middle phase.
    #[serde(default = "default_middle_months")]
    pub middle_months: u32,

    /// First tail rate.
    #[serde(default = "default_middle_end")]
    pub tail_base: f64,

    /// Tail factor per period.
    #[serde(default = "default_tail_factor")]
    pub tail_factor: f64,

    /// Months per tail period.
    #[serde(default = "default_tail_period")]
    pub tail_period: f64,

    /// Spans up to this length use the compressed schedule.
    #[serde(default = "default_compress_at")]
    pub compress_at: u32,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            initial_start: default_initial_start(),
            initial_end: default_initial_end(),
            initial_months: default_initial_months(),
            middle_end: default_middle_end(),
            middle_months: default_middle_months(),
            tail_base: default_middle_end(),
            tail_factor: default_tail_factor(),
            tail_period: default_tail_period(),
            compress_at: default_compress_at(),
        }
    }
}

impl PhaseConfig {
    /// Build the model.
    ///
    /// # Errors
    ///
    /// Returns [`DecayError`] for a schedule whose rates increase.
    pub fn model(&self) -> Result<PiecewisePhaseDecay, DecayError> {
        PiecewisePhaseDecay::new(PhaseSchedule {
            initial_start: self.initial_start,
            initial_end: self.initial_end,
            initial_months: self.initial_months,
            middle_end: self.middle_end,
            middle_months: self.middle_months,
            tail_base: self.tail_base,
            tail_factor: self.tail_factor,
            tail_period: self.tail_period,
            compress_at: self.compress_at,
        })
    }
}

/// Parameters for a magnitude-scaled influence window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Exponential decay rate inside the window.
    #[serde(default = "default_window_decay_rate")]
    pub decay_rate: f64,

    /// Window length for a vanishingly small event.
    #[serde(default = "default_base_window")]
    pub base_window: u32,

    /// Window length for the largest event in the category.
    #[serde(default = "default_max_window")]
    pub max_window: u32,

    /// Lower clamp on the window length.
    #[serde(default = "default_min_window")]
    pub min_window: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            decay_rate: default_window_decay_rate(),
            base_window: default_base_window(),
            max_window: default_max_window(),
            min_window: default_min_window(),
        }
    }
}

impl WindowConfig {
    /// Build the model.
    ///
    /// # Errors
    ///
    /// Returns [`DecayError`] when the windows are not ordered.
    pub fn model(&self) -> Result<MagnitudeScaledWindowDecay, DecayError> {
        MagnitudeScaledWindowDecay::new(
            self.decay_rate,
            self.base_window,
            self.max_window,
            self.min_window,
        )
    }
}

/// Parameters for the social engagement ramp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RampConfig {
    /// Month of peak engagement.
    #[serde(default = "default_peak_month")]
    pub peak_month: u32,

    /// Decline rate in the first month after the peak.
    #[serde(default = "default_initial_decay_rate")]
    pub initial_decay_rate: f64,

    /// Monthly increase of the decline rate.
    #[serde(default = "default_decay_increment")]
    pub decay_increment: f64,

    /// Cap on the decline rate.
    #[serde(default = "default_max_decay_rate")]
    pub max_decay_rate: f64,

    /// Fraction of the magnitude realised at the peak.
    #[serde(default = "default_max_fraction")]
    pub max_fraction: f64,
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            peak_month: default_peak_month(),
            initial_decay_rate: default_initial_decay_rate(),
            decay_increment: default_decay_increment(),
            max_decay_rate: default_max_decay_rate(),
            max_fraction: default_max_fraction(),
        }
    }
}

impl RampConfig {
    /// Build the model.
    ///
    /// # Errors
    ///
    /// Returns [`DecayError`] for a zero peak or a negative rate.
    pub fn model(&self) -> Result<TriangularRampDecay, DecayError> {
        TriangularRampDecay::new(
            self.peak_month,
            self.initial_decay_rate,
            self.decay_increment,
            self.max_decay_rate,
            self.max_fraction,
        )
    }
}

// ---------------------------------------------------------------------------
// Timeline and trends
// ---------------------------------------------------------------------------

/// Which dates define the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanPolicy {
    /// Only event dates.
    #[default]
    Events,
    /// Event dates plus the dates of both external trend series.
    EventsAndTrends,
}

/// Timeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Which dates define the timeline.
    #[serde(default)]
    pub span: SpanPolicy,

    /// Fixed last month; an input document's `end_date` takes precedence.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Fan value trend configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanValueConfig {
    /// Trailing rolling-mean window applied before weighting.
    #[serde(default)]
    pub smoothing_window: Option<usize>,
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_residual_rate() -> f64 {
    0.001
}

const fn default_horizon_months() -> u32 {
    840
}

const fn default_rate_multiplier() -> f64 {
    1.0
}

const fn default_initial_start() -> f64 {
    0.6
}

const fn default_initial_end() -> f64 {
    0.4
}

const fn default_initial_months() -> u32 {
    3
}

const fn default_middle_end() -> f64 {
    0.3
}

const fn default_middle_months() -> u32 {
    6
}

const fn default_tail_factor() -> f64 {
    0.9
}

const fn default_tail_period() -> f64 {
    3.0
}

const fn default_compress_at() -> u32 {
    12
}

const fn default_window_decay_rate() -> f64 {
    0.1
}

const fn default_base_window() -> u32 {
    2
}

const fn default_max_window() -> u32 {
    12
}

const fn default_min_window() -> u32 {
    1
}

const fn default_peak_month() -> u32 {
    6
}

const fn default_initial_decay_rate() -> f64 {
    0.001
}

const fn default_decay_increment() -> f64 {
    0.0005
}

const fn default_max_decay_rate() -> f64 {
    0.1
}

const fn default_max_fraction() -> f64 {
    0.01
}

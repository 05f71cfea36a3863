//! The weight table applied by the combiner.

use mov_types::Category;
use serde::{Deserialize, Serialize};

/// Error returned for a weight that cannot be applied.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum WeightError {
    /// Weight is negative, NaN, or infinite.
    #[error("weight `{name}` must be finite and >= 0, got {value}")]
    Invalid {
        /// Field name of the weight.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
}

/// Every multiplier used to combine category series into the master value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    /// Applied to the external fan-value trend.
    #[serde(default = "default_fan_value")]
    pub fan_value: f64,
    /// Streaming release value.
    #[serde(default = "default_streaming")]
    pub streaming: f64,
    /// Popularity release value.
    #[serde(default = "default_popularity")]
    pub popularity: f64,
    /// Physical retail sales.
    #[serde(default = "default_retail")]
    pub retail: f64,
    /// Concert revenue.
    #[serde(default = "default_concert")]
    pub concert: f64,
    /// Twitter engagement.
    #[serde(default = "default_social_twitter")]
    pub social_twitter: f64,
    /// `YouTube` engagement.
    #[serde(default = "default_social_youtube")]
    pub social_youtube: f64,
    /// Instagram engagement.
    #[serde(default = "default_social_instagram")]
    pub social_instagram: f64,
    /// Merchandise sales.
    #[serde(default = "default_merchandise")]
    pub merchandise: f64,
    /// Broadcast appearances.
    #[serde(default = "default_broadcast")]
    pub broadcast: f64,
    /// Applied to the external management-value series.
    #[serde(default = "default_management")]
    pub management: f64,
}

const fn default_fan_value() -> f64 {
    1.0
}

const fn default_streaming() -> f64 {
    10.0
}

const fn default_popularity() -> f64 {
    3.0
}

const fn default_retail() -> f64 {
    1.0
}

const fn default_concert() -> f64 {
    2.0
}

const fn default_social_twitter() -> f64 {
    40_000.0
}

const fn default_social_youtube() -> f64 {
    40.0
}

const fn default_social_instagram() -> f64 {
    10.0
}

const fn default_merchandise() -> f64 {
    0.7
}

const fn default_broadcast() -> f64 {
    0.2
}

const fn default_management() -> f64 {
    1.0
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            fan_value: default_fan_value(),
            streaming: default_streaming(),
            popularity: default_popularity(),
            retail: default_retail(),
            concert: default_concert(),
            social_twitter: default_social_twitter(),
            social_youtube: default_social_youtube(),
            social_instagram: default_social_instagram(),
            merchandise: default_merchandise(),
            broadcast: default_broadcast(),
            management: default_management(),
        }
    }
}

impl WeightTable {
    /// Weight for an event category.
    pub const fn category(&self, category: Category) -> f64 {
        match category {
            Category::Streaming => self.streaming,
            Category::Popularity => self.popularity,
            Category::Retail => self.retail,
            Category::Concert => self.concert,
            Category::SocialTwitter => self.social_twitter,
            Category::SocialYoutube => self.social_youtube,
            Category::SocialInstagram => self.social_instagram,
            Category::Merchandise => self.merchandise,
            Category::Broadcast => self.broadcast,
        }
    }

    /// Reject negative or non-finite weights.
    pub fn validate(&self) -> Result<(), WeightError> {
        let named = [
            ("fan_value", self.fan_value),
            ("streaming", self.streaming),
            ("popularity", self.popularity),
            ("retail", self.retail),
            ("concert", self.concert),
            ("social_twitter", self.social_twitter),
            ("social_youtube", self.social_youtube),
            ("social_instagram", self.social_instagram),
            ("merchandise", self.merchandise),
            ("broadcast", self.broadcast),
            ("management", self.management),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(WeightError::Invalid { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let weights = WeightTable::default();
        assert!(weights.validate().is_ok());
        assert!((weights.category(Category::SocialTwitter) - 40_000.0).abs() < f64::EPSILON);
        assert!((weights.category(Category::Merchandise) - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_weight_is_rejected() {
        let weights = WeightTable {
            concert: -2.0,
            ..WeightTable::default()
        };
        assert_eq!(
            weights.validate(),
            Err(WeightError::Invalid {
                name: "concert",
                value: -2.0
            })
        );
        let weights = WeightTable {
            retail: f64::NAN,
            ..WeightTable::default()
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let weights: WeightTable =
            serde_json::from_str(r#"{"streaming": 12.5}"#).unwrap_or_default();
        assert!((weights.streaming - 12.5).abs() < f64::EPSILON);
        assert!((weights.popularity - 3.0).abs() < f64::EPSILON);
    }
}

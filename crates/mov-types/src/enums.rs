//! Enumeration types for the valuation engine.
//!
//! A [`Category`] names the kind of signal an event carries. Categories
//! roll up into the three mid-level aggregates of the master value curve
//! ([`AggregateGroup`]).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// The kind of signal an [`Event`](crate::Event) carries.
///
/// Each category is distributed over time by its own decay model and is
/// weighted independently when the master curve is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Category {
    /// Per-release streaming revenue.
    Streaming,
    /// Per-release popularity value (track popularity times followers).
    Popularity,
    /// Physical album sales.
    Retail,
    /// Concert and live event revenue.
    Concert,
    /// Engagement value of a single tweet.
    SocialTwitter,
    /// Engagement value of a single video.
    SocialYoutube,
    /// Engagement value of a single Instagram post.
    SocialInstagram,
    /// Merchandise sales snapshot.
    Merchandise,
    /// Broadcast, drama, and variety appearances.
    Broadcast,
}

impl Category {
    /// Every category, in the order used for reporting.
    pub const ALL: [Self; 9] = [
        Self::Streaming,
        Self::Popularity,
        Self::Retail,
        Self::Concert,
        Self::SocialTwitter,
        Self::SocialYoutube,
        Self::SocialInstagram,
        Self::Merchandise,
        Self::Broadcast,
    ];

    /// Stable snake-case name, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Streaming => "streaming",
            Self::Popularity => "popularity",
            Self::Retail => "retail",
            Self::Concert => "concert",
            Self::SocialTwitter => "social_twitter",
            Self::SocialYoutube => "social_youtube",
            Self::SocialInstagram => "social_instagram",
            Self::Merchandise => "merchandise",
            Self::Broadcast => "broadcast",
        }
    }

    /// The mid-level aggregate this category contributes to.
    pub const fn group(self) -> AggregateGroup {
        match self {
            Self::Streaming | Self::Popularity | Self::Retail => AggregateGroup::Portfolio,
            Self::Concert
            | Self::SocialTwitter
            | Self::SocialYoutube
            | Self::SocialInstagram
            | Self::Merchandise => AggregateGroup::LiveContent,
            Self::Broadcast => AggregateGroup::Management,
        }
    }

    /// Look up a category by its serialized name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AggregateGroup
// ---------------------------------------------------------------------------

/// Mid-level aggregate of the master value curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateGroup {
    /// Release portfolio value: streaming, popularity, retail.
    Portfolio,
    /// Live and content value: concerts, social media, merchandise.
    LiveContent,
    /// Management value: broadcast appearances plus the external series.
    Management,
}

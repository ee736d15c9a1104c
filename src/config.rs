//! Analysis settings.
//!
//! Settings come from an optional JSON file; CLI flags override individual
//! fields afterwards. Every field has a default, so an empty object (or no
//! file at all) is a valid configuration:
//! ```json
//! {
//!   "preset": "three",
//!   "low_score_threshold": 20,
//!   "good_average_threshold": 50,
//!   "market": "IT",
//!   "retry": { "max_attempts": 4, "base_delay_ms": 250, "max_delay_ms": 2000 }
//! }
//! ```
//! A custom `"tiers": [{"name": "...", "min_score": 0}, ...]` table takes
//! precedence over `preset`.

use crate::analyzers::grade::{Tier, TierPreset, TierScheme};
use crate::error::Result;
use crate::fetch::RetryPolicy;
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Tracks scoring below this are listed as high-risk.
pub const DEFAULT_LOW_SCORE_THRESHOLD: i32 = 20;

/// Averages at or above this are reported as healthy.
pub const DEFAULT_GOOD_AVERAGE_THRESHOLD: i32 = 50;

pub const DEFAULT_MARKET: &str = "US";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub preset: TierPreset,
    pub tiers: Option<Vec<Tier>>,
    pub low_score_threshold: i32,
    pub good_average_threshold: i32,
    /// Market used for artist top tracks.
    pub market: String,
    pub retry: RetryPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: TierPreset::default(),
            tiers: None,
            low_score_threshold: DEFAULT_LOW_SCORE_THRESHOLD,
            good_average_threshold: DEFAULT_GOOD_AVERAGE_THRESHOLD,
            market: DEFAULT_MARKET.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file at `path`.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{path}'"))?;
        serde_json::from_str(&content).with_context(|| format!("failed to parse config file '{path}'"))
    }

    /// Validated tier scheme plus thresholds, ready for rating.
    pub fn rating_options(&self) -> Result<RatingOptions> {
        let scheme = match &self.tiers {
            Some(tiers) => TierScheme::new(tiers.clone())?,
            None => TierScheme::preset(self.preset),
        };
        Ok(RatingOptions {
            scheme,
            low_score_threshold: self.low_score_threshold,
            good_average_threshold: self.good_average_threshold,
        })
    }
}

/// What the report builder needs to classify tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingOptions {
    pub scheme: TierScheme,
    pub low_score_threshold: i32,
    pub good_average_threshold: i32,
}

impl Default for RatingOptions {
    fn default() -> Self {
        Self {
            scheme: TierScheme::default(),
            low_score_threshold: DEFAULT_LOW_SCORE_THRESHOLD,
            good_average_threshold: DEFAULT_GOOD_AVERAGE_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyzerError;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.rating_options().unwrap(), RatingOptions::default());
    }

    #[test]
    fn test_preset_and_thresholds() {
        let settings: Settings = serde_json::from_str(
            r#"{"preset": "three", "low_score_threshold": 25, "market": "IT"}"#,
        )
        .unwrap();
        let options = settings.rating_options().unwrap();

        assert_eq!(options.scheme, TierScheme::preset(TierPreset::Three));
        assert_eq!(options.low_score_threshold, 25);
        assert_eq!(options.good_average_threshold, DEFAULT_GOOD_AVERAGE_THRESHOLD);
        assert_eq!(settings.market, "IT");
    }

    #[test]
    fn test_custom_tiers_override_preset() {
        let settings: Settings = serde_json::from_str(
            r#"{"preset": "nine", "tiers": [{"name": "hot", "min_score": 50}, {"name": "cold", "min_score": 0}]}"#,
        )
        .unwrap();
        let options = settings.rating_options().unwrap();

        assert_eq!(options.scheme.tiers().len(), 2);
        assert_eq!(options.scheme.classify(50).name, "hot");
        assert_eq!(options.scheme.classify(49).name, "cold");
    }

    #[test]
    fn test_invalid_custom_tiers() {
        let settings: Settings =
            serde_json::from_str(r#"{"tiers": [{"name": "hot", "min_score": 50}]}"#).unwrap();
        assert!(matches!(
            settings.rating_options(),
            Err(AnalyzerError::InvalidTierScheme(_))
        ));
    }

    #[test]
    fn test_partial_retry_section() {
        let settings: Settings = serde_json::from_str(r#"{"retry": {"max_attempts": 5}}"#).unwrap();
        assert_eq!(settings.retry.max_attempts, 5);
        assert_eq!(settings.retry.base_delay_ms, RetryPolicy::default().base_delay_ms);
    }

    #[test]
    fn test_load_from_file() {
        let path = temp_path("popularity_rater_test_config.json");
        fs::write(&path, r#"{"good_average_threshold": 70}"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.good_average_threshold, 70);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load("/nonexistent/config.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/config.json"));
    }
}

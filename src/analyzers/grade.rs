//! Score tiers.
//!
//! A [`TierScheme`] is a table of inclusive lower bounds. A score belongs to
//! the tier with the highest bound it reaches. The canonical scheme:
//!
//! | Range    | Tier      |
//! |----------|-----------|
//! | 90-100   | excellent |
//! | 60-89    | good      |
//! | 40-59    | average   |
//! | 20-39    | low       |
//! | 0-19     | critical  |

use crate::error::{AnalyzerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub name: String,
    pub min_score: i32,
}

impl Tier {
    pub fn new(name: &str, min_score: i32) -> Self {
        Self {
            name: name.to_string(),
            min_score,
        }
    }
}

/// Built-in tier tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TierPreset {
    /// excellent / good / average / low / critical
    #[default]
    Five,
    /// high / medium / low
    Three,
    /// nine bands split at 12/23/34/45/56/67/78/90
    Nine,
}

impl TierPreset {
    fn tiers(self) -> Vec<Tier> {
        let table: &[(&str, i32)] = match self {
            TierPreset::Five => &[
                ("excellent", 90),
                ("good", 60),
                ("average", 40),
                ("low", 20),
                ("critical", 0),
            ],
            TierPreset::Three => &[("high", 60), ("medium", 20), ("low", 0)],
            TierPreset::Nine => &[
                ("superb", 90),
                ("great", 78),
                ("good", 67),
                ("fair", 56),
                ("average", 45),
                ("modest", 34),
                ("weak", 23),
                ("poor", 12),
                ("dead", 0),
            ],
        };
        table.iter().map(|&(name, min)| Tier::new(name, min)).collect()
    }
}

/// An ordered, validated set of tiers covering every score from 0 upwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierScheme {
    // Sorted by descending min_score, never empty.
    tiers: Vec<Tier>,
}

impl TierScheme {
    /// Builds a scheme from an arbitrary tier table.
    ///
    /// The table must be non-empty, use unique names and bounds, and its
    /// lowest bound must be at most 0 so that every score in 0-100 has
    /// exactly one tier.
    pub fn new(mut tiers: Vec<Tier>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(AnalyzerError::InvalidTierScheme(
                "at least one tier is required".into(),
            ));
        }

        let mut names = HashSet::new();
        let mut bounds = HashSet::new();
        for tier in &tiers {
            if tier.name.trim().is_empty() {
                return Err(AnalyzerError::InvalidTierScheme(
                    "tier names must not be empty".into(),
                ));
            }
            if !names.insert(tier.name.as_str()) {
                return Err(AnalyzerError::InvalidTierScheme(format!(
                    "duplicate tier name '{}'",
                    tier.name
                )));
            }
            if !bounds.insert(tier.min_score) {
                return Err(AnalyzerError::InvalidTierScheme(format!(
                    "duplicate lower bound {}",
                    tier.min_score
                )));
            }
        }

        tiers.sort_by(|a, b| b.min_score.cmp(&a.min_score));

        let lowest = tiers[tiers.len() - 1].min_score;
        if lowest > 0 {
            return Err(AnalyzerError::InvalidTierScheme(format!(
                "lowest tier starts at {lowest}, scores below it would be unclassified"
            )));
        }

        Ok(Self { tiers })
    }

    pub fn preset(preset: TierPreset) -> Self {
        let mut tiers = preset.tiers();
        tiers.sort_by(|a, b| b.min_score.cmp(&a.min_score));
        Self { tiers }
    }

    /// Returns the tier for `score`.
    ///
    /// Scores below the lowest bound land in the lowest tier.
    pub fn classify(&self, score: i32) -> &Tier {
        let lowest = &self.tiers[self.tiers.len() - 1];
        self.tiers
            .iter()
            .find(|tier| score >= tier.min_score)
            .unwrap_or(lowest)
    }

    /// Tiers from highest to lowest.
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Each tier with the inclusive score range it covers inside 0-100.
    ///
    /// A tier that covers nothing in that window gets `lower > upper`.
    pub fn ranges(&self) -> Vec<(&Tier, i32, i32)> {
        let mut upper = 100;
        let mut ranges = Vec::with_capacity(self.tiers.len());
        for tier in &self.tiers {
            let lower = tier.min_score.max(0);
            ranges.push((tier, lower, upper));
            upper = tier.min_score.saturating_sub(1).min(100);
        }
        ranges
    }
}

impl Default for TierScheme {
    fn default() -> Self {
        Self::preset(TierPreset::default())
    }
}

impl fmt::Display for TierScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (tier, lower, upper) in self.ranges() {
            if lower > upper {
                continue;
            }
            writeln!(f, "{:>3}-{:<3}  {}", lower, upper, tier.name)?;
        }
        Ok(())
    }
}

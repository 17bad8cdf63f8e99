// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of ThermION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single point in an hourly (or finer) electricity price series
///
/// The series is expected in chronological order; duplicate timestamps
/// are passed through untouched (deduplication is a feed concern).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Start of the interval this price applies to
    pub time: DateTime<Utc>,

    /// Spot price (SEK/kWh)
    pub price_sek_per_kwh: f32,
}

/// Discrete price level derived from the percentile position of the
/// current price within its window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PriceLevel {
    VeryCheap,
    Cheap,
    #[default]
    Normal,
    Expensive,
    VeryExpensive,
}

impl PriceLevel {
    /// Ordering rank, cheapest first. Used to assert classification
    /// monotonicity: a lower price never ranks more expensive.
    pub fn rank(self) -> u8 {
        match self {
            Self::VeryCheap => 0,
            Self::Cheap => 1,
            Self::Normal => 2,
            Self::Expensive => 3,
            Self::VeryExpensive => 4,
        }
    }
}

impl std::fmt::Display for PriceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VeryCheap => write!(f, "very cheap"),
            Self::Cheap => write!(f, "cheap"),
            Self::Normal => write!(f, "normal"),
            Self::Expensive => write!(f, "expensive"),
            Self::VeryExpensive => write!(f, "very expensive"),
        }
    }
}

/// Price statistics over the classified window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min_sek_per_kwh: f32,
    pub max_sek_per_kwh: f32,
    pub avg_sek_per_kwh: f32,
}

/// Thresholds controlling level assignment
///
/// Expensive thresholds default to mirror images of the cheap ones
/// (`100 - cheap`, `100 - very_cheap`) when not set explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyOptions {
    /// Percentile at or below which a price counts as cheap (0-100)
    #[serde(default = "default_cheap_percentile")]
    pub cheap_percentile: f32,

    /// Multiplier applied to `cheap_percentile` for the very-cheap cut
    #[serde(default = "default_very_cheap_multiplier")]
    pub very_cheap_multiplier: f32,

    /// Explicit expensive percentile; mirrored from cheap when `None`
    #[serde(default)]
    pub expensive_percentile: Option<f32>,

    /// Explicit very-expensive percentile; mirrored from very-cheap when `None`
    #[serde(default)]
    pub very_expensive_percentile: Option<f32>,
}

fn default_cheap_percentile() -> f32 {
    25.0
}
fn default_very_cheap_multiplier() -> f32 {
    0.4
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            cheap_percentile: default_cheap_percentile(),
            very_cheap_multiplier: default_very_cheap_multiplier(),
            expensive_percentile: None,
            very_expensive_percentile: None,
        }
    }
}

impl ClassifyOptions {
    /// Effective very-cheap percentile threshold
    pub fn very_cheap_percentile(&self) -> f32 {
        self.cheap_percentile * self.very_cheap_multiplier
    }

    /// Effective expensive percentile threshold
    pub fn effective_expensive_percentile(&self) -> f32 {
        self.expensive_percentile
            .unwrap_or(100.0 - self.cheap_percentile)
    }

    /// Effective very-expensive percentile threshold
    pub fn effective_very_expensive_percentile(&self) -> f32 {
        self.very_expensive_percentile
            .unwrap_or(100.0 - self.very_cheap_percentile())
    }
}

/// Result of classifying the current price against its window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceClassification {
    /// Assigned discrete level
    pub level: PriceLevel,

    /// Percentile of the current price within the window (0-100),
    /// inclusive rank: fraction of window values <= current
    pub percentile: f32,

    /// Position of the current price within [min, max], clamped to [0,1];
    /// 0.5 when the window range is degenerate
    pub normalized_position: f32,

    /// Window statistics backing the classification
    pub range: PriceRange,

    /// Price that was classified (SEK/kWh)
    pub current_sek_per_kwh: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_rank_ordering() {
        assert!(PriceLevel::VeryCheap.rank() < PriceLevel::Cheap.rank());
        assert!(PriceLevel::Cheap.rank() < PriceLevel::Normal.rank());
        assert!(PriceLevel::Normal.rank() < PriceLevel::Expensive.rank());
        assert!(PriceLevel::Expensive.rank() < PriceLevel::VeryExpensive.rank());
    }

    #[test]
    fn test_mirrored_expensive_thresholds() {
        let opts = ClassifyOptions::default();
        assert_eq!(opts.effective_expensive_percentile(), 75.0);
        assert_eq!(opts.effective_very_expensive_percentile(), 90.0);
    }

    #[test]
    fn test_explicit_thresholds_win() {
        let opts = ClassifyOptions {
            expensive_percentile: Some(70.0),
            very_expensive_percentile: Some(95.0),
            ..Default::default()
        };
        assert_eq!(opts.effective_expensive_percentile(), 70.0);
        assert_eq!(opts.effective_very_expensive_percentile(), 95.0);
    }
}

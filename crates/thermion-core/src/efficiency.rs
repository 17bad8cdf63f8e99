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

//! Efficiency (COP) normalization
//!
//! Maps a raw produced/consumed energy ratio onto [0, 1] against learned
//! valid-range bounds. The bounds track running 5th/95th percentile
//! estimates via an exponential update, so a single anomalous sensor
//! read is clipped instead of destabilizing downstream weighting.

use serde::{Deserialize, Serialize};
use thermion_types::thermal::EfficiencyBounds;
use tracing::warn;

/// Exponential update weight for the percentile estimates
const BOUND_LEARNING_RATE: f32 = 0.05;

/// Minimum span kept between the bounds to avoid a degenerate range
const MIN_BOUND_SPAN: f32 = 0.1;

/// Normalizer over learned efficiency bounds
///
/// State is refined monotonically as readings arrive and is only ever
/// reset by an explicit external [`reset`](Self::reset).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EfficiencyNormalizer {
    bounds: EfficiencyBounds,
}

impl EfficiencyNormalizer {
    /// Resume from persisted bounds
    pub fn new(bounds: EfficiencyBounds) -> Self {
        Self { bounds }
    }

    /// Current learned bounds, for persistence
    pub fn bounds(&self) -> &EfficiencyBounds {
        &self.bounds
    }

    /// Normalize a raw efficiency ratio to [0, 1]
    ///
    /// Non-finite or non-positive readings are rejected outright and
    /// return a neutral 0.5 without touching the learned bounds.
    /// Readings outside the learned range are clipped to the nearest
    /// bound before scaling; the bounds themselves only move by the
    /// exponential update, never by the outlier itself.
    pub fn normalize(&mut self, raw_ratio: f32) -> f32 {
        if !raw_ratio.is_finite() || raw_ratio <= 0.0 {
            warn!("Rejecting invalid efficiency ratio {raw_ratio}");
            return 0.5;
        }

        self.update_bounds(raw_ratio);

        let span = (self.bounds.max_ratio - self.bounds.min_ratio).max(MIN_BOUND_SPAN);
        let clipped = raw_ratio.clamp(self.bounds.min_ratio, self.bounds.max_ratio);
        ((clipped - self.bounds.min_ratio) / span).clamp(0.0, 1.0)
    }

    /// Nudge the percentile estimates towards the new reading
    fn update_bounds(&mut self, ratio: f32) {
        let bounds = &mut self.bounds;
        if ratio < bounds.min_ratio {
            bounds.min_ratio += (ratio - bounds.min_ratio) * BOUND_LEARNING_RATE;
        }
        if ratio > bounds.max_ratio {
            bounds.max_ratio += (ratio - bounds.max_ratio) * BOUND_LEARNING_RATE;
        }
        // Keep the range from collapsing when readings cluster tightly
        if bounds.max_ratio - bounds.min_ratio < MIN_BOUND_SPAN {
            bounds.max_ratio = bounds.min_ratio + MIN_BOUND_SPAN;
        }
        bounds.samples += 1;
    }

    /// Explicit external reset back to seed bounds
    pub fn reset(&mut self) {
        self.bounds = EfficiencyBounds::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mid_range_reading_normalizes_between_bounds() {
        let mut normalizer = EfficiencyNormalizer::default();
        // Default bounds 1.5..5.0, midpoint 3.25
        let score = normalizer.normalize(3.25);
        assert!((score - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_readings_at_bounds_hit_endpoints() {
        let mut normalizer = EfficiencyNormalizer::default();
        assert_eq!(normalizer.normalize(1.5), 0.0);
        assert_eq!(normalizer.normalize(5.0), 1.0);
    }

    #[test]
    fn test_outlier_is_clipped_not_propagated() {
        let mut normalizer = EfficiencyNormalizer::default();
        let score = normalizer.normalize(50.0);
        assert_eq!(score, 1.0);
        // Bounds moved only one exponential step, not to the outlier
        assert!(normalizer.bounds().max_ratio < 8.0);
    }

    #[test]
    fn test_invalid_reading_rejected_without_learning() {
        let mut normalizer = EfficiencyNormalizer::default();
        let before = normalizer.bounds().clone();
        assert_eq!(normalizer.normalize(f32::NAN), 0.5);
        assert_eq!(normalizer.normalize(-2.0), 0.5);
        assert_eq!(normalizer.bounds(), &before);
    }

    #[test]
    fn test_bounds_refine_incrementally() {
        let mut normalizer = EfficiencyNormalizer::default();
        for _ in 0..200 {
            normalizer.normalize(0.8);
        }
        // Repeated low readings pull the lower bound down towards them
        assert!(normalizer.bounds().min_ratio < 1.0);
        assert_eq!(normalizer.bounds().samples, 200);
    }

    #[test]
    fn test_reset_restores_seed_bounds() {
        let mut normalizer = EfficiencyNormalizer::default();
        normalizer.normalize(10.0);
        normalizer.reset();
        assert_eq!(normalizer.bounds(), &EfficiencyBounds::default());
    }

    #[test]
    fn test_result_always_in_unit_interval() {
        let mut normalizer = EfficiencyNormalizer::default();
        for ratio in [0.1, 1.0, 2.5, 4.0, 6.0, 100.0] {
            let score = normalizer.normalize(ratio);
            assert!((0.0..=1.0).contains(&score), "score {score} for {ratio}");
        }
    }
}

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

//! Percentile-based spot price classification
//!
//! Turns a price series plus the current price into a percentile, a
//! normalized position within the window range, and a discrete level.
//! Pure and total: malformed input degrades to a documented neutral
//! classification, never an error.

use chrono::{DateTime, Duration, Utc};
use thermion_types::pricing::{
    ClassifyOptions, PriceClassification, PriceLevel, PricePoint, PriceRange,
};
use tracing::warn;

/// Tolerance below which the window range counts as degenerate
const RANGE_EPSILON: f32 = 1e-9;

/// Classify `current_price` against a price window
///
/// Percentile uses inclusive rank (fraction of window values at or below
/// the current price), which keeps ties friendly: a flat window puts
/// every price at the 100th percentile but a degenerate range still
/// normalizes to 0.5.
pub fn classify_price(
    prices: &[f32],
    current_price: f32,
    options: &ClassifyOptions,
) -> PriceClassification {
    let valid: Vec<f32> = prices.iter().copied().filter(|p| p.is_finite()).collect();

    if valid.is_empty() || !current_price.is_finite() {
        return neutral_classification(current_price);
    }

    let len = valid.len() as f32;
    let at_or_below = valid.iter().filter(|&&p| p <= current_price).count() as f32;
    let percentile = at_or_below / len * 100.0;

    let min = valid.iter().copied().fold(f32::INFINITY, f32::min);
    let max = valid.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let avg = valid.iter().sum::<f32>() / len;

    let range_span = max - min;
    let normalized_position = if range_span.abs() < RANGE_EPSILON {
        0.5
    } else {
        ((current_price - min) / range_span).clamp(0.0, 1.0)
    };

    let very_cheap = options.very_cheap_percentile();
    let cheap = options.cheap_percentile;
    let very_expensive = options.effective_very_expensive_percentile();
    let expensive = options.effective_expensive_percentile();

    // Priority order: cheap cuts first, then expensive, else normal
    let level = if percentile <= very_cheap {
        PriceLevel::VeryCheap
    } else if percentile <= cheap {
        PriceLevel::Cheap
    } else if percentile >= very_expensive {
        PriceLevel::VeryExpensive
    } else if percentile >= expensive {
        PriceLevel::Expensive
    } else {
        PriceLevel::Normal
    };

    PriceClassification {
        level,
        percentile,
        normalized_position,
        range: PriceRange {
            min_sek_per_kwh: min,
            max_sek_per_kwh: max,
            avg_sek_per_kwh: avg,
        },
        current_sek_per_kwh: current_price,
    }
}

/// Classify the current price within the horizon `[now, now + hours]`
///
/// Slices the chronological series down to the decision horizon before
/// classifying, so tonight's cheap hours are ranked against the window
/// the decision actually spans rather than the whole feed.
pub fn classify_window(
    series: &[PricePoint],
    current_price: f32,
    now: DateTime<Utc>,
    horizon_hours: u32,
    options: &ClassifyOptions,
) -> PriceClassification {
    let end = now + Duration::hours(i64::from(horizon_hours));
    let window: Vec<f32> = series
        .iter()
        .filter(|p| p.time >= now && p.time <= end)
        .map(|p| p.price_sek_per_kwh)
        .collect();

    if window.is_empty() && !series.is_empty() {
        warn!(
            "Price series has no points in [{}, {}]; classifying against empty window",
            now, end
        );
    }

    classify_price(&window, current_price, options)
}

/// Neutral fallback for empty or invalid input: NORMAL at percentile 50
fn neutral_classification(current_price: f32) -> PriceClassification {
    let price = if current_price.is_finite() {
        current_price
    } else {
        0.0
    };
    warn!("Classifying degraded price input, returning neutral NORMAL at percentile 50");
    PriceClassification {
        level: PriceLevel::Normal,
        percentile: 50.0,
        normalized_position: 0.5,
        range: PriceRange {
            min_sek_per_kwh: price,
            max_sek_per_kwh: price,
            avg_sek_per_kwh: price,
        },
        current_sek_per_kwh: price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn series(prices: &[f32]) -> Vec<PricePoint> {
        let start = Utc::now();
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint {
                time: start + Duration::hours(i as i64),
                price_sek_per_kwh: p,
            })
            .collect()
    }

    #[test]
    fn test_minimum_price_is_low_percentile() {
        let prices = [0.2, 0.5, 0.8, 1.1, 1.4];
        let result = classify_price(&prices, 0.2, &ClassifyOptions::default());
        // Inclusive rank: exactly one of five values <= min
        assert_eq!(result.percentile, 20.0);
        assert_eq!(result.level, PriceLevel::Cheap);
        assert_eq!(result.normalized_position, 0.0);
    }

    #[test]
    fn test_maximum_price_is_top_percentile() {
        let prices = [0.2, 0.5, 0.8, 1.1, 1.4];
        let result = classify_price(&prices, 1.4, &ClassifyOptions::default());
        assert_eq!(result.percentile, 100.0);
        assert_eq!(result.level, PriceLevel::VeryExpensive);
        assert_eq!(result.normalized_position, 1.0);
    }

    #[test]
    fn test_middle_price_is_normal() {
        let prices = [0.2, 0.5, 0.8, 1.1, 1.4];
        let result = classify_price(&prices, 0.8, &ClassifyOptions::default());
        assert_eq!(result.percentile, 60.0);
        assert_eq!(result.level, PriceLevel::Normal);
    }

    #[test]
    fn test_empty_series_degrades_to_neutral() {
        let result = classify_price(&[], 0.5, &ClassifyOptions::default());
        assert_eq!(result.level, PriceLevel::Normal);
        assert_eq!(result.percentile, 50.0);
        assert_eq!(result.normalized_position, 0.5);
        assert_eq!(result.range.min_sek_per_kwh, 0.5);
        assert_eq!(result.range.max_sek_per_kwh, 0.5);
        assert_eq!(result.range.avg_sek_per_kwh, 0.5);
    }

    #[test]
    fn test_non_finite_current_price_degrades_to_zero() {
        let result = classify_price(&[], f32::NAN, &ClassifyOptions::default());
        assert_eq!(result.level, PriceLevel::Normal);
        assert_eq!(result.current_sek_per_kwh, 0.0);
        assert_eq!(result.range.avg_sek_per_kwh, 0.0);
    }

    #[test]
    fn test_non_finite_series_values_are_ignored() {
        let prices = [0.2, f32::NAN, 0.8, f32::INFINITY, 1.4];
        let result = classify_price(&prices, 0.8, &ClassifyOptions::default());
        assert_eq!(result.range.min_sek_per_kwh, 0.2);
        assert_eq!(result.range.max_sek_per_kwh, 1.4);
    }

    #[test]
    fn test_flat_window_normalizes_to_half() {
        let prices = [0.7, 0.7, 0.7, 0.7];
        let result = classify_price(&prices, 0.7, &ClassifyOptions::default());
        assert_eq!(result.normalized_position, 0.5);
        // Every value <= current, so inclusive rank pins percentile at 100
        assert_eq!(result.percentile, 100.0);
    }

    #[test]
    fn test_classification_monotonicity() {
        let prices = [0.1, 0.3, 0.5, 0.7, 0.9, 1.1, 1.3, 1.5, 1.7, 1.9];
        let options = ClassifyOptions::default();
        let mut previous_rank = u8::MAX;
        // Sweep from expensive to cheap; rank must never increase
        for current in [2.0, 1.6, 1.2, 0.8, 0.4, 0.0] {
            let rank = classify_price(&prices, current, &options).level.rank();
            assert!(
                rank <= previous_rank,
                "price {current} ranked {rank} after {previous_rank}"
            );
            previous_rank = rank;
        }
    }

    #[test]
    fn test_explicit_expensive_thresholds() {
        let prices: Vec<f32> = (1..=100).map(|i| i as f32).collect();
        let options = ClassifyOptions {
            expensive_percentile: Some(60.0),
            ..Default::default()
        };
        let result = classify_price(&prices, 65.0, &options);
        assert_eq!(result.level, PriceLevel::Expensive);
    }

    #[test]
    fn test_window_slicing_excludes_past_and_far_future() {
        let now = Utc::now();
        let mut points = series(&[1.0, 0.2, 0.4, 0.6]);
        // Shift first point into the past
        points[0].time = now - Duration::hours(2);
        let result = classify_window(&points, 0.2, now, 8, &ClassifyOptions::default());
        // The 1.0 outlier is outside the horizon, so 0.2 is the window min
        assert_eq!(result.range.min_sek_per_kwh, 0.2);
        assert_eq!(result.range.max_sek_per_kwh, 0.6);
    }

    #[test]
    fn test_window_with_no_points_in_horizon() {
        let now = Utc::now();
        let mut points = series(&[0.5, 0.6]);
        for p in &mut points {
            p.time = now - Duration::hours(24);
        }
        let result = classify_window(&points, 0.5, now, 8, &ClassifyOptions::default());
        assert_eq!(result.level, PriceLevel::Normal);
        assert_eq!(result.percentile, 50.0);
    }
}

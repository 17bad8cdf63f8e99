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

//! Periodic responsiveness recalibration
//!
//! Runs on a long cadence (daily/weekly). Looks at how much the indoor
//! temperature actually moved per unit of price-level change in the
//! recorded history, derives a fresh responsiveness factor, and blends
//! it with the previous one so the factor cannot oscillate.

use serde::{Deserialize, Serialize};
use thermion_types::config::ThermalConstants;
use tracing::info;

use super::history::ThermalHistory;

/// Denominator magnitude below which a ratio is not computed
const DENOMINATOR_EPSILON: f32 = 1e-6;

/// Calibrated factors stay inside this range
const FACTOR_MIN: f32 = 0.1;
const FACTOR_MAX: f32 = 3.0;

/// One (price-level change, temperature response) observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSample {
    /// Change in price level rank between two consecutive samples
    pub price_level_delta: f32,

    /// Indoor temperature change over the same interval (degC)
    pub temp_response_c: f32,
}

/// What a recalibration run did, for logging and persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationOutcome {
    /// A new factor was computed and blended in
    pub applied: bool,

    pub previous_factor: f32,

    /// Equal to `previous_factor` when not applied
    pub new_factor: f32,

    /// Samples that contributed a usable ratio
    pub samples_used: usize,

    pub reason: String,
}

impl CalibrationOutcome {
    fn skipped(previous_factor: f32, samples_used: usize, reason: String) -> Self {
        Self {
            applied: false,
            previous_factor,
            new_factor: previous_factor,
            samples_used,
            reason,
        }
    }
}

/// Pair up consecutive history points into calibration samples
///
/// Each pair contributes (rank delta, indoor delta); pairs where the
/// price level did not move carry no signal and are dropped later by
/// the denominator guard.
pub fn derive_calibration_samples(history: &ThermalHistory) -> Vec<CalibrationSample> {
    let points = history.points();
    points
        .iter()
        .zip(points.iter().skip(1))
        .map(|(a, b)| CalibrationSample {
            price_level_delta: f32::from(b.price_rank) - f32::from(a.price_rank),
            temp_response_c: b.indoor_c - a.indoor_c,
        })
        .collect()
}

/// Recompute the responsiveness factor from historical outcomes
///
/// Requires at least `min_calibration_samples` observations; with fewer,
/// or when every sample has a near-zero price-level delta, the prior
/// factor is returned unchanged. The computed factor is blended as
/// `new = old * (1 - blend) + computed * blend` to avoid oscillation.
pub fn recalibrate_responsiveness(
    current_factor: f32,
    samples: &[CalibrationSample],
    constants: &ThermalConstants,
) -> CalibrationOutcome {
    if samples.len() < constants.min_calibration_samples {
        return CalibrationOutcome::skipped(
            current_factor,
            0,
            format!(
                "insufficient history: {} samples < {} required",
                samples.len(),
                constants.min_calibration_samples
            ),
        );
    }

    let mut ratio_sum = 0.0_f32;
    let mut used = 0_usize;
    for sample in samples {
        if sample.price_level_delta.abs() < DENOMINATOR_EPSILON {
            continue;
        }
        if !sample.temp_response_c.is_finite() {
            continue;
        }
        ratio_sum += (sample.temp_response_c / sample.price_level_delta).abs();
        used += 1;
    }

    if used == 0 {
        return CalibrationOutcome::skipped(
            current_factor,
            0,
            "no samples with a usable price-level change".to_string(),
        );
    }

    let computed = (ratio_sum / used as f32).clamp(FACTOR_MIN, FACTOR_MAX);
    let blend = constants.calibration_blend.clamp(0.0, 1.0);
    let new_factor = (current_factor * (1.0 - blend) + computed * blend).clamp(FACTOR_MIN, FACTOR_MAX);

    info!(
        "Recalibrated responsiveness: {:.3} -> {:.3} (computed {:.3} from {} samples, blend {:.2})",
        current_factor, new_factor, computed, used, blend
    );

    CalibrationOutcome {
        applied: true,
        previous_factor: current_factor,
        new_factor,
        samples_used: used,
        reason: format!(
            "blended computed factor {computed:.3} over {used} samples at weight {blend:.2}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use thermion_types::telemetry::WeatherSnapshot;
    use thermion_types::thermal::ThermalDataPoint;

    fn constants(min_samples: usize) -> ThermalConstants {
        ThermalConstants {
            min_calibration_samples: min_samples,
            ..Default::default()
        }
    }

    fn samples(n: usize, price_delta: f32, temp_delta: f32) -> Vec<CalibrationSample> {
        vec![
            CalibrationSample {
                price_level_delta: price_delta,
                temp_response_c: temp_delta,
            };
            n
        ]
    }

    #[test]
    fn test_insufficient_samples_leaves_factor_unchanged() {
        let outcome = recalibrate_responsiveness(1.0, &samples(10, 1.0, 0.5), &constants(48));
        assert!(!outcome.applied);
        assert_eq!(outcome.new_factor, 1.0);
        assert!(outcome.reason.contains("insufficient history"));
    }

    #[test]
    fn test_near_zero_denominators_leave_factor_unchanged() {
        let outcome = recalibrate_responsiveness(1.2, &samples(48, 0.0, 0.5), &constants(48));
        assert!(!outcome.applied);
        assert_eq!(outcome.new_factor, 1.2);
    }

    #[test]
    fn test_blend_weights_old_and_computed() {
        // All samples say 0.5 degC per price level; blend 0.3
        let outcome = recalibrate_responsiveness(1.0, &samples(48, 1.0, 0.5), &constants(48));
        assert!(outcome.applied);
        assert_eq!(outcome.samples_used, 48);
        let expected = 1.0 * 0.7 + 0.5 * 0.3;
        assert!((outcome.new_factor - expected).abs() < 1e-5);
    }

    #[test]
    fn test_factor_stays_clamped() {
        let outcome = recalibrate_responsiveness(3.0, &samples(48, 0.1, 10.0), &constants(48));
        assert!(outcome.applied);
        assert!(outcome.new_factor <= 3.0);
    }

    #[test]
    fn test_repeated_calibration_converges_without_oscillation() {
        let target = 0.5_f32;
        let mut factor = 2.0_f32;
        let consts = constants(48);
        let obs = samples(48, 1.0, target);
        for _ in 0..20 {
            let outcome = recalibrate_responsiveness(factor, &obs, &consts);
            factor = outcome.new_factor;
        }
        assert!((factor - target).abs() < 0.01);
    }

    #[test]
    fn test_derive_samples_pairs_consecutive_points() {
        let mut history = ThermalHistory::new(10);
        let start = Utc::now();
        for (i, (rank, indoor)) in [(1_u8, 20.0_f32), (2, 20.4), (4, 20.9)].iter().enumerate() {
            history.record(ThermalDataPoint {
                recorded_at: start + Duration::hours(i as i64),
                indoor_c: *indoor,
                outdoor_c: 0.0,
                target_c: 21.0,
                heating_active: true,
                weather: WeatherSnapshot::new(0.0),
                price_rank: *rank,
            });
        }

        let derived = derive_calibration_samples(&history);
        assert_eq!(derived.len(), 2);
        assert_eq!(derived[0].price_level_delta, 1.0);
        assert!((derived[0].temp_response_c - 0.4).abs() < 1e-4);
        assert_eq!(derived[1].price_level_delta, 2.0);
        assert!((derived[1].temp_response_c - 0.5).abs() < 1e-4);
    }
}

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

//! Thermal response analyzer
//!
//! Holds the learned `ThermalCharacteristics` for one zone and answers
//! two forward questions (where will the temperature be, how long until
//! it reaches the target) plus one learning operation that nudges the
//! rates after every observed response.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thermion_types::config::ThermalConstants;
use thermion_types::telemetry::WeatherSnapshot;
use thermion_types::thermal::ThermalCharacteristics;
use tracing::debug;

/// Gap below which a target counts as already reached
const GAP_EPSILON: f32 = 0.05;

/// How strongly thermal mass damps the raw rates (mass 1.0 leaves 30%
/// of the rate, mass 0.0 leaves all of it)
const MASS_DAMPING: f32 = 0.7;

/// Extra heat loss per m/s of wind, applied to the cooling rate
const WIND_LOSS_PER_MS: f32 = 0.015;

/// Relative prediction error under which confidence grows
const GOOD_PREDICTION_ERROR: f32 = 0.25;

/// Time-to-target projection with how much to trust it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeToTargetEstimate {
    /// Estimated minutes until the indoor temperature reaches the
    /// target; `f32::INFINITY` when the target is unreachable (cooling
    /// towards a target below outdoor temperature)
    pub minutes: f32,

    /// 0-1, model confidence decayed for long projections
    pub confidence: f32,
}

/// Analyzer over one zone's learned thermal characteristics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalModel {
    characteristics: ThermalCharacteristics,
    max_learning_step: f32,
}

impl Default for ThermalModel {
    fn default() -> Self {
        Self::from_constants(&ThermalConstants::default())
    }
}

impl ThermalModel {
    /// Resume from persisted characteristics
    pub fn new(characteristics: ThermalCharacteristics, constants: &ThermalConstants) -> Self {
        Self {
            characteristics,
            max_learning_step: constants.max_learning_step,
        }
    }

    /// Fresh model seeded from configuration constants
    pub fn from_constants(constants: &ThermalConstants) -> Self {
        Self {
            characteristics: ThermalCharacteristics::seed(
                constants.initial_heating_rate,
                constants.initial_cooling_rate,
                constants.initial_thermal_mass,
            ),
            max_learning_step: constants.max_learning_step,
        }
    }

    /// Current learned state, for persistence and diagnostics
    pub fn characteristics(&self) -> &ThermalCharacteristics {
        &self.characteristics
    }

    /// Heating rate after thermal mass damping (degC/hour)
    fn effective_heating_rate(&self) -> f32 {
        let damping = 1.0 - self.characteristics.thermal_mass.clamp(0.0, 1.0) * MASS_DAMPING;
        (self.characteristics.heating_rate * damping).max(0.01)
    }

    /// Cooling rate after damping and wind-driven loss (degC/hour)
    fn effective_cooling_rate(&self, weather: &WeatherSnapshot) -> f32 {
        let damping = 1.0 - self.characteristics.thermal_mass.clamp(0.0, 1.0) * MASS_DAMPING;
        let wind_factor = 1.0 + weather.wind_speed_ms.unwrap_or(0.0).max(0.0) * WIND_LOSS_PER_MS;
        (self.characteristics.cooling_rate * damping * wind_factor).max(0.01)
    }

    /// Project the indoor temperature `minutes` from now
    ///
    /// While heating the temperature moves towards the target and stops
    /// there; while idle it decays towards outdoor and never undershoots
    /// it. Linear approach is deliberate: the learned rates already
    /// absorb the building's envelope behaviour.
    pub fn predict_temperature(
        &self,
        current_c: f32,
        target_c: f32,
        outdoor_c: f32,
        heating_active: bool,
        weather: &WeatherSnapshot,
        minutes: f32,
    ) -> f32 {
        let hours = minutes.max(0.0) / 60.0;

        if heating_active {
            if target_c <= current_c {
                return current_c;
            }
            let rise = self.effective_heating_rate() * hours;
            (current_c + rise).min(target_c)
        } else {
            if outdoor_c >= current_c {
                return current_c;
            }
            let drop = self.effective_cooling_rate(weather) * hours;
            (current_c - drop).max(outdoor_c)
        }
    }

    /// Minutes until `current_c` reaches `target_c`, with confidence
    ///
    /// Scales with the magnitude of the gap: a 0.5 degC nudge and a
    /// 3 degC boost give proportionally different estimates, which
    /// downstream preheat scheduling relies on.
    pub fn time_to_target(
        &self,
        current_c: f32,
        target_c: f32,
        outdoor_c: f32,
        weather: &WeatherSnapshot,
    ) -> TimeToTargetEstimate {
        let gap = target_c - current_c;

        if gap.abs() < GAP_EPSILON {
            return TimeToTargetEstimate {
                minutes: 0.0,
                confidence: self.characteristics.model_confidence,
            };
        }

        let (minutes, reachable) = if gap > 0.0 {
            (gap / self.effective_heating_rate() * 60.0, true)
        } else if target_c < outdoor_c {
            // Passive cooling cannot drop below outdoor temperature
            (f32::INFINITY, false)
        } else {
            (-gap / self.effective_cooling_rate(weather) * 60.0, true)
        };

        // Long projections deserve less trust than short nudges
        let horizon_decay = 1.0 / (1.0 + gap.abs() / 5.0);
        let confidence = if reachable {
            (self.characteristics.model_confidence * horizon_decay).clamp(0.0, 1.0)
        } else {
            0.0
        };

        TimeToTargetEstimate {
            minutes,
            confidence,
        }
    }

    /// Fold one observed response into the learned rates
    ///
    /// `expected_delta_c` must be the delta the controller actually
    /// requested for the observation period, never a fixed constant; a
    /// hardcoded expectation biases the learned rates systematically.
    /// Requests too small to measure are skipped.
    pub fn update_thermal_response(&mut self, observed_delta_c: f32, expected_delta_c: f32) {
        if !observed_delta_c.is_finite() || !expected_delta_c.is_finite() {
            return;
        }
        if expected_delta_c.abs() < GAP_EPSILON {
            debug!(
                "Skipping thermal update: requested delta {:.3} degC below measurable threshold",
                expected_delta_c
            );
            return;
        }

        // Ratio > 1 means the building responded faster than predicted
        let response_ratio = observed_delta_c / expected_delta_c;
        let error = response_ratio - 1.0;
        let step = (error * self.max_learning_step).clamp(-self.max_learning_step, self.max_learning_step);

        let chars = &mut self.characteristics;
        if expected_delta_c > 0.0 {
            chars.heating_rate = (chars.heating_rate * (1.0 + step)).clamp(0.1, 10.0);
        } else {
            chars.cooling_rate = (chars.cooling_rate * (1.0 + step)).clamp(0.05, 5.0);
        }

        // Faster response than expected means less effective mass
        chars.thermal_mass = (chars.thermal_mass - step * 0.5).clamp(0.05, 0.95);

        if error.abs() <= GOOD_PREDICTION_ERROR {
            chars.model_confidence = (chars.model_confidence + 0.05).min(1.0);
        } else {
            chars.model_confidence = (chars.model_confidence - 0.05).max(0.05);
        }
        chars.last_updated = Utc::now();

        debug!(
            "Thermal update: observed {:.2} vs expected {:.2} degC, heating_rate {:.3}, cooling_rate {:.3}, mass {:.2}, confidence {:.2}",
            observed_delta_c,
            expected_delta_c,
            chars.heating_rate,
            chars.cooling_rate,
            chars.thermal_mass,
            chars.model_confidence
        );
    }

    /// Replace the responsiveness factor after periodic calibration
    pub fn apply_responsiveness_factor(&mut self, factor: f32) {
        self.characteristics.responsiveness_factor = factor;
        self.characteristics.last_updated = Utc::now();
    }
}

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

use crate::telemetry::WeatherSnapshot;

/// Learned thermal behaviour of one building/zone
///
/// Created with seed defaults at first use, nudged after every observed
/// response, persisted by the storage collaborator. Superseded, never
/// deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalCharacteristics {
    /// Indoor warm-up rate while heating is active (degC/hour)
    pub heating_rate: f32,

    /// Indoor cool-down rate towards outdoor while idle (degC/hour)
    pub cooling_rate: f32,

    /// Damping factor, 0-1; higher mass means slower response
    pub thermal_mass: f32,

    /// Confidence in the learned rates, 0-1
    pub model_confidence: f32,

    /// Scalar governing how aggressively price changes translate into
    /// setpoint changes; recalibrated periodically from history
    pub responsiveness_factor: f32,

    /// Last learning or calibration update
    pub last_updated: DateTime<Utc>,
}

impl ThermalCharacteristics {
    /// Seed characteristics for a building we know nothing about yet
    pub fn seed(heating_rate: f32, cooling_rate: f32, thermal_mass: f32) -> Self {
        Self {
            heating_rate,
            cooling_rate,
            thermal_mass,
            model_confidence: 0.3,
            responsiveness_factor: 1.0,
            last_updated: Utc::now(),
        }
    }
}

impl Default for ThermalCharacteristics {
    fn default() -> Self {
        Self::seed(1.5, 0.4, 0.5)
    }
}

/// One telemetry sample recorded for the learning model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalDataPoint {
    pub recorded_at: DateTime<Utc>,
    pub indoor_c: f32,
    pub outdoor_c: f32,
    pub target_c: f32,
    pub heating_active: bool,
    pub weather: WeatherSnapshot,
    /// Price level rank at sample time (0 = very cheap .. 4 = very
    /// expensive); consumed in aggregate by calibration
    pub price_rank: u8,
}

/// Learned valid range for the raw efficiency (COP-like) ratio
///
/// Updated incrementally as readings arrive; readings outside the bounds
/// are clipped before normalization so a single bad sensor read cannot
/// destabilize downstream weighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyBounds {
    /// Estimate of the 5th percentile of observed ratios
    pub min_ratio: f32,

    /// Estimate of the 95th percentile of observed ratios
    pub max_ratio: f32,

    /// Readings folded into the estimates so far
    pub samples: u64,
}

impl Default for EfficiencyBounds {
    fn default() -> Self {
        // Plausible air/water heat pump COP range before any learning
        Self {
            min_ratio: 1.5,
            max_ratio: 5.0,
            samples: 0,
        }
    }
}

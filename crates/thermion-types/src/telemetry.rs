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

/// Point-in-time device readings supplied by the device-state collaborator
///
/// Owned by the caller; the core never retains a snapshot across cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// When the readings were taken
    pub sampled_at: DateTime<Utc>,

    /// Measured indoor temperature
    pub indoor_c: f32,

    /// Setpoint the device is currently holding
    pub current_target_c: f32,

    /// Hot water tank temperature, when a tank sensor exists
    #[serde(default)]
    pub tank_c: Option<f32>,

    /// Whether the compressor/burner is currently running
    #[serde(default)]
    pub heating_active: bool,
}

/// Outdoor conditions from the weather collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub outdoor_c: f32,

    /// Wind speed (m/s); increases effective heat loss when present
    #[serde(default)]
    pub wind_speed_ms: Option<f32>,

    /// Cloud cover (0-100); reserved for solar gain adjustment
    #[serde(default)]
    pub cloud_cover_pct: Option<f32>,
}

impl WeatherSnapshot {
    pub fn new(outdoor_c: f32) -> Self {
        Self {
            outdoor_c,
            wind_speed_ms: None,
            cloud_cover_pct: None,
        }
    }
}

/// Occupancy state selecting which comfort band applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Occupancy {
    #[default]
    Occupied,
    Away,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_snapshot_new() {
        let weather = WeatherSnapshot::new(-3.5);
        assert_eq!(weather.outdoor_c, -3.5);
        assert!(weather.wind_speed_ms.is_none());
    }
}

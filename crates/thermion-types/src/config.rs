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

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ============= Engine Configuration =============

/// Acceptable indoor temperature range for one occupancy state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComfortBand {
    pub lower_c: f32,
    pub upper_c: f32,
}

impl ComfortBand {
    pub fn new(lower_c: f32, upper_c: f32) -> Self {
        Self { lower_c, upper_c }
    }

    /// Band width in degrees
    pub fn span(&self) -> f32 {
        self.upper_c - self.lower_c
    }

    /// Copy with lower/upper swapped if they arrive inverted
    ///
    /// Malformed bands are a caller bug, but propagating an inverted band
    /// would flip the price interpolation direction, so the engine repairs
    /// instead of trusting.
    pub fn normalized(self) -> Self {
        if self.lower_c < self.upper_c {
            self
        } else {
            Self {
                lower_c: self.upper_c,
                upper_c: self.lower_c,
            }
        }
    }
}

/// Central configuration for one decision cycle
///
/// Immutable per cycle; the configuration collaborator reloads and
/// re-validates it on settings changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub comfort: ComfortConfig,
    #[serde(rename = "setpoints")]
    pub limits: SetpointLimits,
    #[serde(default)]
    pub preheat: PreheatConfig,
    #[serde(default)]
    pub coast: CoastConfig,
    #[serde(default)]
    pub safety: SafetyConfig,
    #[serde(default)]
    pub dhw: DhwConfig,
    #[serde(default)]
    pub thermal: ThermalConstants,
}

/// Comfort bands per occupancy state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComfortConfig {
    pub occupied: ComfortBand,
    pub away: ComfortBand,
}

impl Default for ComfortConfig {
    fn default() -> Self {
        Self {
            occupied: ComfortBand::new(20.0, 21.5),
            away: ComfortBand::new(17.0, 19.0),
        }
    }
}

/// Hard setpoint limits and hardware step size
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetpointLimits {
    /// Absolute minimum dispatchable setpoint
    pub min_setpoint_c: f32,

    /// Absolute maximum dispatchable setpoint
    pub max_setpoint_c: f32,

    /// Hardware setpoint granularity; targets are rounded to multiples
    /// Default: 0.5 degC (typical heat pump register resolution)
    #[serde(default = "default_step")]
    pub step_c: f32,

    /// Optional ramp limit per dispatched change
    #[serde(default)]
    pub max_delta_per_change_c: Option<f32>,
}

impl Default for SetpointLimits {
    fn default() -> Self {
        Self {
            min_setpoint_c: 16.0,
            max_setpoint_c: 23.0,
            step_c: default_step(),
            max_delta_per_change_c: None,
        }
    }
}

/// Preheat behaviour ahead of expensive periods
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreheatConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Price window length considered by the decision engine (hours)
    /// Default: 8
    #[serde(default = "default_preheat_horizon")]
    pub horizon_hours: u32,

    /// Percentile at or below which preheating is considered (0-100)
    #[serde(default = "default_preheat_cheap_percentile")]
    pub cheap_percentile: f32,

    /// Preheat only when it is at least this cold outside
    /// Default: 5 degC (above that the building barely loses heat)
    #[serde(default = "default_preheat_outdoor_below")]
    pub outdoor_below_c: f32,

    /// How far above the comfort band upper bound to bank heat
    #[serde(default = "default_preheat_margin")]
    pub margin_c: f32,
}

impl Default for PreheatConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            horizon_hours: default_preheat_horizon(),
            cheap_percentile: default_preheat_cheap_percentile(),
            outdoor_below_c: default_preheat_outdoor_below(),
            margin_c: default_preheat_margin(),
        }
    }
}

/// Coasting behaviour during expensive periods
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoastConfig {
    /// Percentile at or above which coasting is considered (0-100)
    /// Default: 70
    #[serde(default = "default_coast_percentile")]
    pub expensive_percentile: f32,

    /// Margin kept above the comfort band lower bound while coasting
    #[serde(default = "default_coast_margin")]
    pub margin_c: f32,

    /// Minimum indoor buffer above the lower bound required to coast
    #[serde(default = "default_coast_buffer")]
    pub min_buffer_c: f32,
}

impl Default for CoastConfig {
    fn default() -> Self {
        Self {
            expensive_percentile: default_coast_percentile(),
            margin_c: default_coast_margin(),
            min_buffer_c: default_coast_buffer(),
        }
    }
}

/// Anti-cycling and cold-snap safety parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Minimum delta for a setpoint change to be significant (hysteresis)
    /// Default: 0.3 degC
    #[serde(default = "default_deadband")]
    pub deadband_c: f32,

    /// Minimum minutes between two dispatched changes on one channel
    /// Default: 15
    #[serde(default = "default_min_change_minutes")]
    pub min_change_interval_minutes: u32,

    /// Outdoor temperature at or below which the extreme-weather floor applies
    /// Default: -15 degC
    #[serde(default = "default_extreme_outdoor")]
    pub extreme_weather_outdoor_c: f32,

    /// Setpoint floor applied during extreme weather, price logic ignored
    /// Default: 20 degC
    #[serde(default = "default_extreme_floor")]
    pub extreme_weather_min_c: f32,

    /// Margin above the upper bound used when recovering from a comfort breach
    #[serde(default = "default_recovery_margin")]
    pub recovery_margin_c: f32,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            deadband_c: default_deadband(),
            min_change_interval_minutes: default_min_change_minutes(),
            extreme_weather_outdoor_c: default_extreme_outdoor(),
            extreme_weather_min_c: default_extreme_floor(),
            recovery_margin_c: default_recovery_margin(),
        }
    }
}

/// Domestic hot water scheduling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DhwConfig {
    /// Price window length for tank decisions (hours). Default: 12
    #[serde(default = "default_dhw_horizon")]
    pub horizon_hours: u32,

    /// Percentile at or below which the tank heats immediately
    #[serde(default = "default_dhw_heat_now_percentile")]
    pub heat_now_percentile: f32,

    /// Percentile at or above which heating is deferred
    #[serde(default = "default_dhw_delay_percentile")]
    pub delay_percentile: f32,

    /// Nominal tank setpoint
    #[serde(default = "default_tank_target")]
    pub tank_target_c: f32,

    /// Legionella-safe tank floor
    #[serde(default = "default_tank_min")]
    pub tank_min_c: f32,

    /// Hardware tank ceiling
    #[serde(default = "default_tank_max")]
    pub tank_max_c: f32,

    /// Extra degrees banked during very cheap hours
    #[serde(default = "default_tank_boost")]
    pub cheap_boost_c: f32,

    /// Degrees shaved off during very expensive hours
    #[serde(default = "default_tank_drop")]
    pub expensive_drop_c: f32,
}

impl Default for DhwConfig {
    fn default() -> Self {
        Self {
            horizon_hours: default_dhw_horizon(),
            heat_now_percentile: default_dhw_heat_now_percentile(),
            delay_percentile: default_dhw_delay_percentile(),
            tank_target_c: default_tank_target(),
            tank_min_c: default_tank_min(),
            tank_max_c: default_tank_max(),
            cheap_boost_c: default_tank_boost(),
            expensive_drop_c: default_tank_drop(),
        }
    }
}

/// Seed values and learning bounds for the thermal model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalConstants {
    /// Initial heating rate before any learning (degC/hour at full output)
    #[serde(default = "default_heating_rate")]
    pub initial_heating_rate: f32,

    /// Initial cooling rate before any learning (degC/hour towards outdoor)
    #[serde(default = "default_cooling_rate")]
    pub initial_cooling_rate: f32,

    /// Initial thermal mass damping factor (0-1, higher = slower response)
    #[serde(default = "default_thermal_mass")]
    pub initial_thermal_mass: f32,

    /// Maximum per-update nudge applied to learned rates
    #[serde(default = "default_learning_step")]
    pub max_learning_step: f32,

    /// Minimum historical samples before recalibration runs
    /// Default: 48 (two days of hourly records)
    #[serde(default = "default_min_calibration_samples")]
    pub min_calibration_samples: usize,

    /// Weight of the freshly computed responsiveness factor in the blend
    /// Default: 0.3 (new = old * 0.7 + computed * 0.3)
    #[serde(default = "default_calibration_blend")]
    pub calibration_blend: f32,

    /// Rolling telemetry window capacity (samples)
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

impl Default for ThermalConstants {
    fn default() -> Self {
        Self {
            initial_heating_rate: default_heating_rate(),
            initial_cooling_rate: default_cooling_rate(),
            initial_thermal_mass: default_thermal_mass(),
            max_learning_step: default_learning_step(),
            min_calibration_samples: default_min_calibration_samples(),
            calibration_blend: default_calibration_blend(),
            history_capacity: default_history_capacity(),
        }
    }
}

// Default value functions for serde
fn default_true() -> bool {
    true
}
fn default_step() -> f32 {
    0.5
}
fn default_preheat_horizon() -> u32 {
    8
}
fn default_preheat_cheap_percentile() -> f32 {
    25.0
}
fn default_preheat_outdoor_below() -> f32 {
    5.0
}
fn default_preheat_margin() -> f32 {
    0.5
}
fn default_coast_percentile() -> f32 {
    70.0
}
fn default_coast_margin() -> f32 {
    0.1
}
fn default_coast_buffer() -> f32 {
    0.2
}
fn default_deadband() -> f32 {
    0.3
}
fn default_min_change_minutes() -> u32 {
    15
}
fn default_extreme_outdoor() -> f32 {
    -15.0
}
fn default_extreme_floor() -> f32 {
    20.0
}
fn default_recovery_margin() -> f32 {
    0.2
}
fn default_dhw_horizon() -> u32 {
    12
}
fn default_dhw_heat_now_percentile() -> f32 {
    25.0
}
fn default_dhw_delay_percentile() -> f32 {
    75.0
}
fn default_tank_target() -> f32 {
    50.0
}
fn default_tank_min() -> f32 {
    45.0
}
fn default_tank_max() -> f32 {
    60.0
}
fn default_tank_boost() -> f32 {
    5.0
}
fn default_tank_drop() -> f32 {
    3.0
}
fn default_heating_rate() -> f32 {
    1.5
}
fn default_cooling_rate() -> f32 {
    0.4
}
fn default_thermal_mass() -> f32 {
    0.5
}
fn default_learning_step() -> f32 {
    0.05
}
fn default_min_calibration_samples() -> usize {
    48
}
fn default_calibration_blend() -> f32 {
    0.3
}
fn default_history_capacity() -> usize {
    672
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            comfort: ComfortConfig::default(),
            limits: SetpointLimits::default(),
            preheat: PreheatConfig::default(),
            coast: CoastConfig::default(),
            safety: SafetyConfig::default(),
            dhw: DhwConfig::default(),
            thermal: ThermalConstants::default(),
        }
    }
}

impl EngineConfig {
    /// Validate invariants the decision engine relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        for band in [self.comfort.occupied, self.comfort.away] {
            if band.lower_c >= band.upper_c {
                return Err(ConfigError::InvertedComfortBand {
                    lower_c: band.lower_c,
                    upper_c: band.upper_c,
                });
            }
        }
        if self.limits.min_setpoint_c >= self.limits.max_setpoint_c {
            return Err(ConfigError::InvertedSetpointLimits {
                min_c: self.limits.min_setpoint_c,
                max_c: self.limits.max_setpoint_c,
            });
        }
        if self.limits.step_c <= 0.0 {
            return Err(ConfigError::NonPositiveStep(self.limits.step_c));
        }
        if self.safety.deadband_c < 0.0 {
            return Err(ConfigError::NegativeDeadband(self.safety.deadband_c));
        }
        if self.preheat.horizon_hours == 0 {
            return Err(ConfigError::EmptyPreheatHorizon(self.preheat.horizon_hours));
        }
        if self.dhw.tank_min_c >= self.dhw.tank_max_c {
            return Err(ConfigError::InvertedTankLimits {
                min_c: self.dhw.tank_min_c,
                max_c: self.dhw.tank_max_c,
            });
        }
        Ok(())
    }

    /// Defensively repaired copy: swapped comfort bands and setpoint
    /// limits, non-negative deadband, positive step
    ///
    /// Used by the engine at the top of each cycle so a malformed config
    /// degrades to a sane decision instead of an inverted interpolation.
    pub fn normalized(&self) -> Self {
        let mut cfg = self.clone();
        cfg.comfort.occupied = cfg.comfort.occupied.normalized();
        cfg.comfort.away = cfg.comfort.away.normalized();
        if cfg.limits.min_setpoint_c > cfg.limits.max_setpoint_c {
            std::mem::swap(&mut cfg.limits.min_setpoint_c, &mut cfg.limits.max_setpoint_c);
        }
        if cfg.limits.step_c <= 0.0 {
            cfg.limits.step_c = default_step();
        }
        if cfg.safety.deadband_c < 0.0 {
            cfg.safety.deadband_c = 0.0;
        }
        cfg
    }
}

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

//! Error types for configuration validation
//!
//! The decision pipeline itself never fails on malformed optional input
//! (it degrades to neutral outputs instead); errors exist only for
//! configuration that callers must validate before entering the loop.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("inverted comfort band: lower {lower_c} >= upper {upper_c}")]
    InvertedComfortBand { lower_c: f32, upper_c: f32 },

    #[error("setpoint limits inverted: min {min_c} >= max {max_c}")]
    InvertedSetpointLimits { min_c: f32, max_c: f32 },

    #[error("setpoint step must be positive, got {0}")]
    NonPositiveStep(f32),

    #[error("deadband must be non-negative, got {0}")]
    NegativeDeadband(f32),

    #[error("preheat horizon must be at least 1 hour, got {0}")]
    EmptyPreheatHorizon(u32),

    #[error("tank setpoint limits inverted: min {min_c} >= max {max_c}")]
    InvertedTankLimits { min_c: f32, max_c: f32 },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

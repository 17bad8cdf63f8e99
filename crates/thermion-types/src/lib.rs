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

pub mod config;
pub mod decision;
pub mod error;
pub mod pricing;
pub mod telemetry;
pub mod thermal;

// Re-export common types for convenience
pub use config::{ComfortBand, EngineConfig, PreheatConfig, SafetyConfig, SetpointLimits};
pub use decision::{
    Channel, ComfortRisk, DhwAction, DhwDecision, HeatingAction, HeatingDecision,
    SetpointConstraintsResult,
};
pub use error::{ConfigError, Result};
pub use pricing::{ClassifyOptions, PriceClassification, PriceLevel, PricePoint, PriceRange};
pub use telemetry::{Occupancy, TelemetrySnapshot, WeatherSnapshot};
pub use thermal::{EfficiencyBounds, ThermalCharacteristics, ThermalDataPoint};

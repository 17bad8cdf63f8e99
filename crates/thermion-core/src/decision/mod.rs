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

mod dhw;
mod heating;

pub use dhw::compute_dhw_decision;
pub use heating::compute_heating_decision;

use chrono::{DateTime, Utc};
use thermion_types::pricing::PricePoint;
use thermion_types::telemetry::{Occupancy, TelemetrySnapshot, WeatherSnapshot};

use crate::thermal::ThermalModel;

/// Everything one decision cycle reads, threaded in explicitly
///
/// No ambient state: optional subsystems are `Option`s, lockout history
/// is a plain timestamp owned by the dispatch collaborator. The same
/// context serves both the heating and the hot water decision.
#[derive(Debug, Clone)]
pub struct DecisionContext<'a> {
    /// Decision cycle timestamp
    pub now: DateTime<Utc>,

    /// Chronological price series covering at least the decision horizon
    pub prices: &'a [PricePoint],

    /// Convenience current price from the feed (SEK/kWh)
    pub current_price_sek_per_kwh: f32,

    pub telemetry: &'a TelemetrySnapshot,

    pub weather: &'a WeatherSnapshot,

    pub occupancy: Occupancy,

    /// Learned thermal model for this zone, when one exists yet
    pub thermal: Option<&'a ThermalModel>,

    /// Normalized efficiency score [0, 1] from the latest COP reading,
    /// when an efficiency normalizer is wired up
    pub efficiency_score: Option<f32>,

    /// When this channel last had a setpoint change dispatched
    pub last_change: Option<DateTime<Utc>>,
}

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

//! ThermION decision core
//!
//! Pure, synchronous pipeline deciding once per control cycle what
//! setpoint a heating appliance should run at, balancing electricity
//! cost against comfort bands and device safety. All I/O (device
//! commands, price and weather feeds, persistence) lives in external
//! collaborators; this crate is computation over passed-in values only.
//!
//! Pipeline per cycle:
//! classifier -> decision engine (fed by thermal model + efficiency
//! normalizer) -> constraint gate -> external dispatch.

pub mod constraints;
pub mod decision;
pub mod efficiency;
pub mod pricing;
pub mod thermal;

pub use constraints::{SetpointConstraintsInput, apply_setpoint_constraints};
pub use decision::{DecisionContext, compute_dhw_decision, compute_heating_decision};
pub use efficiency::EfficiencyNormalizer;
pub use pricing::{classify_price, classify_window};
pub use thermal::{
    CalibrationOutcome, CalibrationSample, ThermalHistory, ThermalModel, TimeToTargetEstimate,
    recalibrate_responsiveness,
};

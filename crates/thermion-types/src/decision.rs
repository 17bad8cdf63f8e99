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

/// Control channel with independent lockout state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Zone1,
    Zone2,
    Tank,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zone1 => write!(f, "zone1"),
            Self::Zone2 => write!(f, "zone2"),
            Self::Tank => write!(f, "tank"),
        }
    }
}

/// What the heating decision asks the dispatcher to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatingAction {
    NoChange,
    SetTarget,
}

/// Comfort exposure of a proposed change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComfortRisk {
    #[default]
    None,
    Low,
    High,
}

/// One heating decision per cycle per zone (immutable output value)
///
/// The `to_c` here is the engine's raw proposal; it must still pass the
/// constraint gate before anything may be dispatched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatingDecision {
    pub action: HeatingAction,
    pub from_c: f32,
    pub to_c: f32,
    pub reason: String,
    pub comfort_risk: ComfortRisk,
    /// Heuristic: sign(delta) * current price, a one-unit-of-energy-per-
    /// hour proxy, not a calibrated energy model
    pub expected_delta_cost_per_hour_sek: f32,
}

/// What the hot water decision asks the dispatcher to do
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DhwAction {
    Maintain,
    HeatNow,
    Delay,
    SetTankTarget,
}

/// Hot water decision for the current cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DhwDecision {
    pub action: DhwAction,
    pub reason: String,

    /// Cheapest upcoming hour (0-23) to heat in, set on `Delay`
    #[serde(default)]
    pub scheduled_hour: Option<u32>,

    /// Adjusted tank setpoint, set on `SetTankTarget`
    #[serde(default)]
    pub tank_target_c: Option<f32>,
}

/// Certified output of the constraint gate; the only value the core
/// declares safe to dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetpointConstraintsResult {
    /// Final clamped, ramp-limited, step-rounded setpoint
    pub constrained_c: f32,

    /// Delta from the current target after all constraints
    pub delta_c: f32,

    /// Delta is at least the deadband
    pub changed: bool,

    /// Min/max clamp altered the proposal
    pub clamped: bool,

    /// Per-change ramp limit altered the proposal
    pub ramp_limited: bool,

    /// Step rounding altered the proposal
    pub step_rounded: bool,

    /// Change is significant but the anti-cycling window has not elapsed;
    /// the value must not be dispatched this cycle
    pub lockout_active: bool,

    /// Every constraint that fired, or "within constraints"
    pub reason: String,
}

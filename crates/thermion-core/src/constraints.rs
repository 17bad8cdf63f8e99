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

//! Setpoint constraint gate
//!
//! The single authority between a proposed setpoint and the device.
//! Clamp, ramp-limit, step-round, deadband-check, lockout-check, in that
//! exact order; each step feeds the next. Stateless and reentrant: all
//! history (the last-change timestamp) arrives with the call, so the
//! caller keeps one timestamp per channel and serializes updates to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thermion_types::decision::{Channel, SetpointConstraintsResult};
use tracing::debug;

/// Everything the gate needs for one certification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetpointConstraintsInput {
    pub channel: Channel,

    /// Raw proposal from the decision engine
    pub proposed_c: f32,

    /// Setpoint the device currently holds
    pub current_target_c: f32,

    pub min_c: f32,
    pub max_c: f32,

    /// Hardware step; values are rounded to the nearest multiple
    pub step_c: f32,

    /// Hysteresis threshold for a change to count as significant
    pub deadband_c: f32,

    /// Ramp limit per dispatched change, when configured
    pub max_delta_per_change_c: Option<f32>,

    /// Anti-cycling window; 0 disables the lockout check
    pub min_change_minutes: u32,

    /// When this channel last changed, if known
    pub last_change: Option<DateTime<Utc>>,

    /// Evaluation timestamp
    pub now: DateTime<Utc>,
}

/// Round to the nearest multiple of `step_c`, via fixed-decimal
/// rounding so `20.3` never comes back as `20.300000000000004`
fn round_to_step(value: f32, step_c: f32) -> f32 {
    if step_c <= 0.0 {
        return value;
    }
    let stepped = (value / step_c).round() * step_c;
    // Two decimals covers every realistic hardware step (0.1, 0.25, 0.5)
    (stepped * 100.0).round() / 100.0
}

/// Certify a proposed setpoint for dispatch
///
/// The returned value is the only one the core declares dispatch-safe;
/// when `lockout_active` is set the change is computed but must be held
/// back this cycle.
pub fn apply_setpoint_constraints(input: &SetpointConstraintsInput) -> SetpointConstraintsResult {
    let mut fired: Vec<String> = Vec::new();

    // 1. Hard limits
    let clamped_value = input.proposed_c.clamp(input.min_c, input.max_c);
    let clamped = (clamped_value - input.proposed_c).abs() > f32::EPSILON;
    if clamped {
        fired.push(format!(
            "clamped {:.2} to [{:.1}, {:.1}]",
            input.proposed_c, input.min_c, input.max_c
        ));
    }

    // 2. Ramp limit relative to the current target
    let mut limited_value = clamped_value;
    let mut ramp_limited = false;
    if let Some(max_delta) = input.max_delta_per_change_c {
        if max_delta > 0.0 {
            let delta = clamped_value - input.current_target_c;
            if delta.abs() > max_delta {
                limited_value = input.current_target_c + delta.signum() * max_delta;
                ramp_limited = true;
                fired.push(format!("ramp-limited to +/-{max_delta:.2} degC per change"));
            }
        }
    }

    // 3. Hardware step rounding
    let rounded_value = round_to_step(limited_value, input.step_c);
    let step_rounded = (rounded_value - limited_value).abs() > 1e-6;
    if step_rounded {
        fired.push(format!("rounded to {:.2} degC step", input.step_c));
    }

    // 4. Significance against the deadband
    let delta_c = rounded_value - input.current_target_c;
    let changed = delta_c.abs() > 0.0 && delta_c.abs() >= input.deadband_c.max(0.0);
    if !changed && (input.proposed_c - input.current_target_c).abs() > f32::EPSILON {
        fired.push(format!(
            "within deadband ({:.2} < {:.2} degC)",
            delta_c.abs(),
            input.deadband_c
        ));
    }

    // 5. Anti-cycling lockout
    let mut lockout_active = false;
    if changed && input.min_change_minutes > 0 {
        if let Some(last_change) = input.last_change {
            let elapsed_secs = input.now.signed_duration_since(last_change).num_seconds();
            let min_secs = i64::from(input.min_change_minutes) * 60;
            if elapsed_secs < min_secs {
                lockout_active = true;
                let remaining_minutes = (min_secs - elapsed_secs + 59) / 60;
                fired.push(format!("lockout {remaining_minutes}m"));
            }
        }
    }

    let reason = if fired.is_empty() {
        "within constraints".to_string()
    } else {
        fired.join("; ")
    };

    debug!(
        "Constraints [{}]: {:.2} -> {:.2} (delta {:.2}, changed {}, lockout {}): {}",
        input.channel, input.proposed_c, rounded_value, delta_c, changed, lockout_active, reason
    );

    SetpointConstraintsResult {
        constrained_c: rounded_value,
        delta_c,
        changed,
        clamped,
        ramp_limited,
        step_rounded,
        lockout_active,
        reason,
    }
}

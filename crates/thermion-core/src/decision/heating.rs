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

//! Space heating decision
//!
//! Interpolates the setpoint within the comfort band from the price
//! percentile, then lets overrides reshape it in strict priority order:
//! comfort recovery first, then the extreme-weather floor, then the
//! preheat/coast price logic, with plain interpolation as the fallback.

use thermion_types::config::EngineConfig;
use thermion_types::decision::{ComfortRisk, HeatingAction, HeatingDecision};
use thermion_types::pricing::ClassifyOptions;
use thermion_types::telemetry::Occupancy;
use tracing::debug;

use super::DecisionContext;
use crate::pricing::classify_window;

/// Minimum efficiency score at which banking heat still pays off;
/// below this a poor COP eats the price advantage
const PREHEAT_MIN_EFFICIENCY: f32 = 0.2;

/// Propose a heating target for the current cycle
///
/// Pure function over config and context. The returned target is a raw
/// proposal; only the constraint gate certifies a value for dispatch.
pub fn compute_heating_decision(config: &EngineConfig, ctx: &DecisionContext<'_>) -> HeatingDecision {
    let cfg = config.normalized();
    let band = match ctx.occupancy {
        Occupancy::Occupied => cfg.comfort.occupied,
        Occupancy::Away => cfg.comfort.away,
    };

    let options = ClassifyOptions {
        cheap_percentile: cfg.preheat.cheap_percentile,
        ..Default::default()
    };
    let classification = classify_window(
        ctx.prices,
        ctx.current_price_sek_per_kwh,
        ctx.now,
        cfg.preheat.horizon_hours,
        &options,
    );
    let percentile = classification.percentile / 100.0;

    let indoor = ctx.telemetry.indoor_c;
    let outdoor = ctx.weather.outdoor_c;
    let responsiveness = ctx
        .thermal
        .map_or(1.0, |m| m.characteristics().responsiveness_factor);

    // Cheaper price moves the target towards the warm end of the band
    let baseline = band.lower_c + (1.0 - percentile) * band.span();

    let comfort_floor = band.lower_c - cfg.safety.deadband_c / 2.0;
    let efficiency_ok = ctx
        .efficiency_score
        .is_none_or(|score| score >= PREHEAT_MIN_EFFICIENCY);

    let (mut target, branch_reason) = if indoor < comfort_floor {
        // Highest priority: get back into the band regardless of price
        let recovery = (band.upper_c + cfg.safety.recovery_margin_c).min(cfg.limits.max_setpoint_c);
        (
            recovery,
            format!(
                "comfort recovery: indoor {:.1} degC below band floor {:.1} degC",
                indoor, comfort_floor
            ),
        )
    } else if cfg.preheat.enabled
        && classification.percentile <= cfg.preheat.cheap_percentile
        && outdoor < cfg.preheat.outdoor_below_c
        && indoor < band.upper_c
        && efficiency_ok
    {
        // Bank thermal energy while electricity is cheap and it is cold
        // enough outside for the buffer to matter
        let boost = band.upper_c + cfg.preheat.margin_c * responsiveness;
        (
            boost,
            format!(
                "preheat: cheap window (percentile {:.0}) with {:.1} degC outdoors",
                classification.percentile, outdoor
            ),
        )
    } else if classification.percentile >= cfg.coast.expensive_percentile
        && indoor > band.lower_c + cfg.coast.min_buffer_c
    {
        // Ride the stored heat through the expensive hours
        (
            band.lower_c + cfg.coast.margin_c,
            format!(
                "coast: expensive window (percentile {:.0}) with {:.1} degC of buffer",
                classification.percentile,
                indoor - band.lower_c
            ),
        )
    } else {
        let direction = if percentile < 0.5 {
            "cheaper hour favours warmer target"
        } else {
            "pricier hour favours cooler target"
        };
        (
            baseline,
            format!(
                "price interpolation: {} (percentile {:.0})",
                direction, classification.percentile
            ),
        )
    };

    // Safety overrides economy in extreme weather
    let mut reason = branch_reason;
    if outdoor <= cfg.safety.extreme_weather_outdoor_c && target < cfg.safety.extreme_weather_min_c {
        target = cfg.safety.extreme_weather_min_c;
        reason = format!(
            "extreme weather floor {:.1} degC at {:.1} degC outdoors; {}",
            cfg.safety.extreme_weather_min_c, outdoor, reason
        );
    }

    target = target.clamp(cfg.limits.min_setpoint_c, cfg.limits.max_setpoint_c);

    let from_c = ctx.telemetry.current_target_c;
    let delta = target - from_c;
    let comfort_risk = classify_comfort_risk(indoor, band.lower_c, band.upper_c, delta, &cfg);

    debug!(
        "Heating decision: band [{:.1}, {:.1}], percentile {:.0}, target {:.2} (from {:.2}), {}",
        band.lower_c, band.upper_c, classification.percentile, target, from_c, reason
    );

    if delta.abs() < cfg.safety.deadband_c {
        return HeatingDecision {
            action: HeatingAction::NoChange,
            from_c,
            to_c: from_c,
            reason: format!("within deadband ({:.2} < {:.2} degC)", delta.abs(), cfg.safety.deadband_c),
            comfort_risk,
            expected_delta_cost_per_hour_sek: 0.0,
        };
    }

    if let Some(last_change) = ctx.last_change {
        let elapsed_minutes = ctx.now.signed_duration_since(last_change).num_seconds() as f32 / 60.0;
        let min_interval = cfg.safety.min_change_interval_minutes as f32;
        if elapsed_minutes < min_interval {
            let remaining = (min_interval - elapsed_minutes).ceil() as i64;
            return HeatingDecision {
                action: HeatingAction::NoChange,
                from_c,
                to_c: from_c,
                reason: format!("lockout {remaining}m"),
                comfort_risk,
                expected_delta_cost_per_hour_sek: 0.0,
            };
        }
    }

    // One-unit-of-energy-per-hour proxy, not a calibrated energy model
    let cost_heuristic = delta.signum() * ctx.current_price_sek_per_kwh;

    HeatingDecision {
        action: HeatingAction::SetTarget,
        from_c,
        to_c: target,
        reason,
        comfort_risk,
        expected_delta_cost_per_hour_sek: cost_heuristic,
    }
}

/// Comfort exposure of the proposed move
///
/// High when already below the band floor; Low when the move heads away
/// from a band edge the indoor temperature is already close to.
fn classify_comfort_risk(
    indoor: f32,
    lower: f32,
    upper: f32,
    delta: f32,
    cfg: &EngineConfig,
) -> ComfortRisk {
    let deadband = cfg.safety.deadband_c;
    if indoor < lower - deadband / 2.0 {
        ComfortRisk::High
    } else if delta < 0.0 && indoor <= lower + deadband {
        ComfortRisk::Low
    } else if delta > 0.0 && indoor >= upper - deadband {
        ComfortRisk::Low
    } else {
        ComfortRisk::None
    }
}

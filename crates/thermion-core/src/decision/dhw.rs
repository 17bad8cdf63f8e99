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

//! Domestic hot water decision
//!
//! A three-way percentile threshold over an extended horizon, not the
//! comfort-band interpolation used for space heating: the tank has far
//! more flexibility about when it heats than the rooms do.

use chrono::{Duration, Timelike};
use thermion_types::config::EngineConfig;
use thermion_types::decision::{DhwAction, DhwDecision};
use thermion_types::pricing::{ClassifyOptions, PriceLevel};
use tracing::debug;

use super::DecisionContext;
use crate::pricing::classify_window;

/// Decide what the hot water tank should do this cycle
pub fn compute_dhw_decision(config: &EngineConfig, ctx: &DecisionContext<'_>) -> DhwDecision {
    let cfg = config.normalized();
    let dhw = &cfg.dhw;

    let options = ClassifyOptions {
        cheap_percentile: dhw.heat_now_percentile,
        expensive_percentile: Some(dhw.delay_percentile),
        ..Default::default()
    };
    let classification = classify_window(
        ctx.prices,
        ctx.current_price_sek_per_kwh,
        ctx.now,
        dhw.horizon_hours,
        &options,
    );

    debug!(
        "DHW decision: percentile {:.0} ({}), tank {:?} degC",
        classification.percentile, classification.level, ctx.telemetry.tank_c
    );

    // Safety first: a cold tank heats regardless of price
    if let Some(tank_c) = ctx.telemetry.tank_c {
        if tank_c < dhw.tank_min_c {
            return DhwDecision {
                action: DhwAction::HeatNow,
                reason: format!(
                    "tank {:.1} degC below safety floor {:.1} degC",
                    tank_c, dhw.tank_min_c
                ),
                scheduled_hour: None,
                tank_target_c: None,
            };
        }
    }

    if classification.percentile <= dhw.heat_now_percentile {
        // Very cheap hours additionally bank extra tank heat
        if classification.level == PriceLevel::VeryCheap {
            let boosted = (dhw.tank_target_c + dhw.cheap_boost_c).min(dhw.tank_max_c);
            return DhwDecision {
                action: DhwAction::SetTankTarget,
                reason: format!(
                    "very cheap window (percentile {:.0}): banking tank heat",
                    classification.percentile
                ),
                scheduled_hour: None,
                tank_target_c: Some(boosted),
            };
        }
        return DhwDecision {
            action: DhwAction::HeatNow,
            reason: format!(
                "cheap window (percentile {:.0} <= {:.0})",
                classification.percentile, dhw.heat_now_percentile
            ),
            scheduled_hour: None,
            tank_target_c: None,
        };
    }

    if classification.percentile >= dhw.delay_percentile {
        // Very expensive hours additionally shed stored tank heat
        if classification.level == PriceLevel::VeryExpensive {
            let dropped = (dhw.tank_target_c - dhw.expensive_drop_c).max(dhw.tank_min_c);
            return DhwDecision {
                action: DhwAction::SetTankTarget,
                reason: format!(
                    "very expensive window (percentile {:.0}): shedding tank heat",
                    classification.percentile
                ),
                scheduled_hour: None,
                tank_target_c: Some(dropped),
            };
        }
        let scheduled_hour = cheapest_upcoming_hour(ctx, dhw.horizon_hours);
        return DhwDecision {
            action: DhwAction::Delay,
            reason: format!(
                "expensive window (percentile {:.0} >= {:.0}), deferring tank heat",
                classification.percentile, dhw.delay_percentile
            ),
            scheduled_hour,
            tank_target_c: None,
        };
    }

    DhwDecision {
        action: DhwAction::Maintain,
        reason: format!(
            "normal window (percentile {:.0}), holding tank at {:.1} degC",
            classification.percentile, dhw.tank_target_c
        ),
        scheduled_hour: None,
        tank_target_c: None,
    }
}

/// Hour of day (0-23) of the cheapest price point within the horizon
fn cheapest_upcoming_hour(ctx: &DecisionContext<'_>, horizon_hours: u32) -> Option<u32> {
    let end = ctx.now + Duration::hours(i64::from(horizon_hours));
    ctx.prices
        .iter()
        .filter(|p| p.time >= ctx.now && p.time <= end && p.price_sek_per_kwh.is_finite())
        .min_by(|a, b| {
            a.price_sek_per_kwh
                .partial_cmp(&b.price_sek_per_kwh)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|p| p.time.hour())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use thermion_types::pricing::PricePoint;
    use thermion_types::telemetry::{Occupancy, TelemetrySnapshot, WeatherSnapshot};

    fn telemetry(tank_c: Option<f32>) -> TelemetrySnapshot {
        TelemetrySnapshot {
            sampled_at: Utc::now(),
            indoor_c: 20.5,
            current_target_c: 20.5,
            tank_c,
            heating_active: false,
        }
    }

    fn hourly_prices(values: &[f32]) -> Vec<PricePoint> {
        let now = Utc::now();
        values
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint {
                time: now + Duration::minutes(5 + 60 * i as i64),
                price_sek_per_kwh: p,
            })
            .collect()
    }

    fn context<'a>(
        prices: &'a [PricePoint],
        current_price: f32,
        telemetry: &'a TelemetrySnapshot,
        weather: &'a WeatherSnapshot,
    ) -> DecisionContext<'a> {
        DecisionContext {
            now: Utc::now(),
            prices,
            current_price_sek_per_kwh: current_price,
            telemetry,
            weather,
            occupancy: Occupancy::Occupied,
            thermal: None,
            efficiency_score: None,
            last_change: None,
        }
    }

    #[test]
    fn test_cheap_window_heats_now() {
        let cfg = EngineConfig::default();
        let prices = hourly_prices(&[0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0, 1.1]);
        let tel = telemetry(Some(50.0));
        let weather = WeatherSnapshot::new(5.0);
        // 0.25 ranks above one of ten: 10th percentile, but not very cheap
        let ctx = context(&prices, 0.25, &tel, &weather);

        let decision = compute_dhw_decision(&cfg, &ctx);
        assert!(matches!(
            decision.action,
            DhwAction::HeatNow | DhwAction::SetTankTarget
        ));
    }

    #[test]
    fn test_very_cheap_window_banks_tank_heat() {
        let cfg = EngineConfig::default();
        let prices: Vec<PricePoint> =
            hourly_prices(&(1..=20).map(|i| i as f32 * 0.1).collect::<Vec<_>>());
        let tel = telemetry(Some(50.0));
        let weather = WeatherSnapshot::new(5.0);
        // At or below one of twenty values: 5th percentile, very cheap
        let ctx = context(&prices, 0.1, &tel, &weather);

        let decision = compute_dhw_decision(&cfg, &ctx);
        assert_eq!(decision.action, DhwAction::SetTankTarget);
        // target 50 + boost 5, below the 60 ceiling
        assert_eq!(decision.tank_target_c, Some(55.0));
    }

    #[test]
    fn test_expensive_window_delays_with_schedule() {
        let cfg = EngineConfig::default();
        let prices = hourly_prices(&[1.0, 0.2, 0.9, 1.1, 1.2, 1.3, 1.4, 1.5, 1.6, 1.7]);
        let tel = telemetry(Some(50.0));
        let weather = WeatherSnapshot::new(5.0);
        // Eight of ten at or below 1.5: 80th percentile, expensive but
        // not very expensive
        let ctx = context(&prices, 1.5, &tel, &weather);

        let decision = compute_dhw_decision(&cfg, &ctx);
        assert_eq!(decision.action, DhwAction::Delay);
        // Cheapest upcoming point is the 0.2 an hour in
        assert_eq!(decision.scheduled_hour, Some(prices[1].time.hour()));
    }

    #[test]
    fn test_very_expensive_window_sheds_tank_heat() {
        let cfg = EngineConfig::default();
        let prices = hourly_prices(&[0.2, 0.4, 0.6, 0.8, 1.0, 1.2, 1.4, 1.6, 1.8, 2.0]);
        let tel = telemetry(Some(50.0));
        let weather = WeatherSnapshot::new(5.0);
        // Priciest value of the window: 100th percentile
        let ctx = context(&prices, 2.0, &tel, &weather);

        let decision = compute_dhw_decision(&cfg, &ctx);
        assert_eq!(decision.action, DhwAction::SetTankTarget);
        // target 50 minus drop 3, still above the 45 floor
        assert_eq!(decision.tank_target_c, Some(47.0));
        assert!(decision.reason.contains("shedding tank heat"));
    }

    #[test]
    fn test_expensive_drop_clamps_to_tank_floor() {
        let mut cfg = EngineConfig::default();
        cfg.dhw.expensive_drop_c = 10.0;
        let prices = hourly_prices(&[0.2, 0.4, 0.6, 0.8, 1.0, 1.2, 1.4, 1.6, 1.8, 2.0]);
        let tel = telemetry(Some(50.0));
        let weather = WeatherSnapshot::new(5.0);
        let ctx = context(&prices, 2.0, &tel, &weather);

        let decision = compute_dhw_decision(&cfg, &ctx);
        // 50 - 10 would undershoot the safety floor; clamp to 45
        assert_eq!(decision.tank_target_c, Some(cfg.dhw.tank_min_c));
    }

    #[test]
    fn test_normal_window_maintains() {
        let cfg = EngineConfig::default();
        let prices = hourly_prices(&[0.2, 0.4, 0.6, 0.8, 1.0, 1.2, 1.4, 1.6, 1.8, 2.0]);
        let tel = telemetry(Some(50.0));
        let weather = WeatherSnapshot::new(5.0);
        // Five of ten at or below: 50th percentile
        let ctx = context(&prices, 1.0, &tel, &weather);

        let decision = compute_dhw_decision(&cfg, &ctx);
        assert_eq!(decision.action, DhwAction::Maintain);
    }

    #[test]
    fn test_cold_tank_overrides_expensive_price() {
        let cfg = EngineConfig::default();
        let prices = hourly_prices(&[0.2, 0.4, 0.6, 0.8, 1.0, 1.2, 1.4, 1.6, 1.8, 2.0]);
        // Below the 45 degC safety floor
        let tel = telemetry(Some(40.0));
        let weather = WeatherSnapshot::new(5.0);
        let ctx = context(&prices, 2.0, &tel, &weather);

        let decision = compute_dhw_decision(&cfg, &ctx);
        assert_eq!(decision.action, DhwAction::HeatNow);
        assert!(decision.reason.contains("safety floor"));
    }

    #[test]
    fn test_no_tank_sensor_still_decides() {
        let cfg = EngineConfig::default();
        let prices = hourly_prices(&[0.2, 0.4, 0.6, 0.8, 1.0, 1.2, 1.4, 1.6, 1.8, 2.0]);
        let tel = telemetry(None);
        let weather = WeatherSnapshot::new(5.0);
        let ctx = context(&prices, 1.0, &tel, &weather);

        let decision = compute_dhw_decision(&cfg, &ctx);
        assert_eq!(decision.action, DhwAction::Maintain);
    }

    #[test]
    fn test_empty_series_maintains() {
        let cfg = EngineConfig::default();
        let tel = telemetry(Some(50.0));
        let weather = WeatherSnapshot::new(5.0);
        let ctx = context(&[], 0.5, &tel, &weather);

        let decision = compute_dhw_decision(&cfg, &ctx);
        // Neutral percentile 50 lands in the maintain band
        assert_eq!(decision.action, DhwAction::Maintain);
    }
}

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
use std::collections::VecDeque;
use thermion_types::thermal::ThermalDataPoint;

/// Capacity-bounded rolling window of telemetry samples
///
/// The one contract: never lose the most recent N points, silently
/// discard older ones. No computation lives here; calibration consumes
/// the window in aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalHistory {
    points: VecDeque<ThermalDataPoint>,
    capacity: usize,
    last_recorded: Option<DateTime<Utc>>,
}

impl Default for ThermalHistory {
    fn default() -> Self {
        Self::new(672) // Four weeks of hourly samples
    }
}

impl ThermalHistory {
    /// Create a window keeping at most `capacity` samples
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            last_recorded: None,
        }
    }

    /// Append one sample, evicting the oldest once at capacity
    pub fn record(&mut self, point: ThermalDataPoint) {
        self.last_recorded = Some(point.recorded_at);
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    /// All retained samples, oldest first
    pub fn points(&self) -> &VecDeque<ThermalDataPoint> {
        &self.points
    }

    /// Most recent sample, if any
    pub fn latest(&self) -> Option<&ThermalDataPoint> {
        self.points.back()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether enough samples exist for a consumer needing `required`
    pub fn has_sufficient_data(&self, required: usize) -> bool {
        self.points.len() >= required
    }

    /// When the newest sample was recorded
    pub fn last_recorded(&self) -> Option<DateTime<Utc>> {
        self.last_recorded
    }

    /// Drop all samples (explicit external reset only)
    pub fn clear(&mut self) {
        self.points.clear();
        self.last_recorded = None;
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state snapshot.

use chrono::{DateTime, Utc};

use crate::types::{Direction, Speed};

use super::StateChange;

/// Snapshot of everything the fan reports.
///
/// A snapshot is never mutated in place. Transports build one with the
/// `with_*` methods, and the coordinator replaces its stored snapshot as a
/// whole.
///
/// When `connected` is `false`, every other field still holds the last
/// known good value (or the initial unknown value if the device has never
/// been reached), never a synthesized default.
///
/// # Examples
///
/// ```
/// use blowcontrol::state::DeviceState;
/// use blowcontrol::types::{Direction, Speed};
///
/// let state = DeviceState::new()
///     .with_power(true)
///     .with_speed(Speed::LOW)
///     .with_direction(Direction::Reverse)
///     .with_temperature_c(21.5);
///
/// assert!(state.power());
/// assert_eq!(state.speed(), Speed::LOW);
/// assert!(!state.connected());
/// ```
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeviceState {
    /// Whether the fan is powered.
    power: bool,
    /// Speed level (0-4), independent of `power`.
    speed: Speed,
    /// Whether the head is oscillating.
    oscillating: bool,
    /// Airflow direction.
    direction: Direction,
    /// Ambient temperature in degrees Celsius.
    temperature_c: f64,
    /// Relative humidity in percent.
    humidity_pct: f64,
    /// PM2.5 concentration in µg/m³.
    pm25: f64,
    /// Motor speed in revolutions per minute.
    fan_rpm: u32,
    /// Whether the most recent fetch succeeded within its timeout.
    connected: bool,
    /// Wall-clock time of the last successful fetch.
    last_seen: Option<DateTime<Utc>>,
}

impl DeviceState {
    /// Creates the initial unknown state (`connected == false`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Builders ==========

    /// Returns a copy with the power flag set.
    #[must_use]
    pub fn with_power(mut self, power: bool) -> Self {
        self.power = power;
        self
    }

    /// Returns a copy with the speed level set.
    #[must_use]
    pub fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = speed;
        self
    }

    /// Returns a copy with the oscillation flag set.
    #[must_use]
    pub fn with_oscillating(mut self, oscillating: bool) -> Self {
        self.oscillating = oscillating;
        self
    }

    /// Returns a copy with the direction set.
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Returns a copy with the temperature set.
    #[must_use]
    pub fn with_temperature_c(mut self, celsius: f64) -> Self {
        self.temperature_c = celsius;
        self
    }

    /// Returns a copy with the humidity set.
    #[must_use]
    pub fn with_humidity_pct(mut self, percent: f64) -> Self {
        self.humidity_pct = percent;
        self
    }

    /// Returns a copy with the PM2.5 reading set.
    #[must_use]
    pub fn with_pm25(mut self, pm25: f64) -> Self {
        self.pm25 = pm25;
        self
    }

    /// Returns a copy with the motor RPM set.
    #[must_use]
    pub fn with_fan_rpm(mut self, rpm: u32) -> Self {
        self.fan_rpm = rpm;
        self
    }

    /// Marks a freshly fetched snapshot as connected at the given time.
    #[must_use]
    pub(crate) fn connected_at(mut self, at: DateTime<Utc>) -> Self {
        self.connected = true;
        self.last_seen = Some(at);
        self
    }

    /// Returns a copy with `connected == false` and every other field kept.
    #[must_use]
    pub(crate) fn disconnected(&self) -> Self {
        Self {
            connected: false,
            ..self.clone()
        }
    }

    // ========== Accessors ==========

    /// Whether the fan is powered.
    #[must_use]
    pub fn power(&self) -> bool {
        self.power
    }

    /// The speed level.
    #[must_use]
    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// Whether the head is oscillating.
    #[must_use]
    pub fn oscillating(&self) -> bool {
        self.oscillating
    }

    /// The airflow direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Temperature in degrees Celsius.
    #[must_use]
    pub fn temperature_c(&self) -> f64 {
        self.temperature_c
    }

    /// Relative humidity in percent.
    #[must_use]
    pub fn humidity_pct(&self) -> f64 {
        self.humidity_pct
    }

    /// PM2.5 concentration in µg/m³.
    #[must_use]
    pub fn pm25(&self) -> f64 {
        self.pm25
    }

    /// Motor speed in RPM.
    #[must_use]
    pub fn fan_rpm(&self) -> u32 {
        self.fan_rpm
    }

    /// `true` only when the most recent fetch succeeded within its timeout.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.connected
    }

    /// Wall-clock time of the last successful fetch, if there ever was one.
    #[must_use]
    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.last_seen
    }

    /// Returns `true` until the first successful fetch.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.last_seen.is_none()
    }

    // ========== Diff ==========

    /// Lists the field-level differences from `self` to `newer`.
    ///
    /// `last_seen` is bookkeeping and never reported as a change.
    #[must_use]
    pub fn diff(&self, newer: &Self) -> Vec<StateChange> {
        let mut changes = Vec::new();

        macro_rules! push_if_changed {
            ($field:ident, $variant:ident) => {
                if self.$field != newer.$field {
                    changes.push(StateChange::$variant(newer.$field));
                }
            };
        }

        push_if_changed!(power, Power);
        push_if_changed!(speed, Speed);
        push_if_changed!(oscillating, Oscillating);
        push_if_changed!(direction, Direction);
        push_if_changed!(temperature_c, Temperature);
        push_if_changed!(humidity_pct, Humidity);
        push_if_changed!(pm25, Pm25);
        push_if_changed!(fan_rpm, FanRpm);
        push_if_changed!(connected, Connected);

        changes
    }

    /// Returns `true` if every reported field (everything except
    /// `connected` and `last_seen`) matches `other`.
    #[must_use]
    pub fn same_readings(&self, other: &Self) -> bool {
        self.diff(other)
            .iter()
            .all(|change| matches!(change, StateChange::Connected(_)))
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Field-level state change representation.
//!
//! State changes describe how one [`DeviceState`](super::DeviceState)
//! differs from the next. They are produced by
//! [`DeviceState::diff`](super::DeviceState::diff) after every refresh and
//! carried in [`CoordinatorEvent::Refreshed`](crate::event::CoordinatorEvent::Refreshed)
//! for diagnostics.
//!
//! # Change Types
//!
//! - Control changes: [`StateChange::Power`], [`StateChange::Speed`],
//!   [`StateChange::Oscillating`], [`StateChange::Direction`]
//! - Measurement changes: [`StateChange::Temperature`],
//!   [`StateChange::Humidity`], [`StateChange::Pm25`], [`StateChange::FanRpm`]
//! - Link changes: [`StateChange::Connected`]

use std::fmt;

use crate::types::{Direction, Speed};

/// A single field that changed between two snapshots, with its new value.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum StateChange {
    /// Power flag changed.
    Power(bool),
    /// Speed level changed.
    Speed(Speed),
    /// Oscillation flag changed.
    Oscillating(bool),
    /// Airflow direction changed.
    Direction(Direction),
    /// Temperature reading changed (°C).
    Temperature(f64),
    /// Humidity reading changed (%).
    Humidity(f64),
    /// PM2.5 reading changed (µg/m³).
    Pm25(f64),
    /// Motor RPM changed.
    FanRpm(u32),
    /// Connectivity changed.
    Connected(bool),
}

impl StateChange {
    /// Returns `true` for fields the actuator controls.
    #[must_use]
    pub fn is_control(&self) -> bool {
        matches!(
            self,
            Self::Power(_) | Self::Speed(_) | Self::Oscillating(_) | Self::Direction(_)
        )
    }

    /// Returns `true` for read-only measurements.
    #[must_use]
    pub fn is_measurement(&self) -> bool {
        matches!(
            self,
            Self::Temperature(_) | Self::Humidity(_) | Self::Pm25(_) | Self::FanRpm(_)
        )
    }

    /// Returns `true` for a connectivity change.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connected(_))
    }
}

impl fmt::Display for StateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Power(on) => write!(f, "power={}", if *on { "on" } else { "off" }),
            Self::Speed(speed) => write!(f, "speed={speed}"),
            Self::Oscillating(on) => write!(f, "oscillating={on}"),
            Self::Direction(dir) => write!(f, "direction={dir}"),
            Self::Temperature(c) => write!(f, "temperature={c}°C"),
            Self::Humidity(pct) => write!(f, "humidity={pct}%"),
            Self::Pm25(value) => write!(f, "pm25={value}"),
            Self::FanRpm(rpm) => write!(f, "rpm={rpm}"),
            Self::Connected(connected) => write!(f, "connected={connected}"),
        }
    }
}

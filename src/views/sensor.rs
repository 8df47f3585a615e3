// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only measurement views.

use std::fmt;

use crate::observer::{LastState, Observer};
use crate::state::DeviceState;

use super::EntityInfo;

/// Which reading a [`SensorView`] exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Ambient temperature.
    Temperature,
    /// Relative humidity.
    Humidity,
    /// PM2.5 concentration.
    AirQuality,
    /// Motor speed.
    FanRpm,
}

impl SensorKind {
    /// Every kind, in registration order.
    pub const ALL: [Self; 4] = [
        Self::Temperature,
        Self::Humidity,
        Self::AirQuality,
        Self::FanRpm,
    ];

    /// Suffix of the unique id.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::AirQuality => "air_quality",
            Self::FanRpm => "fan_speed",
        }
    }

    /// Suffix of the display name.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Humidity => "Humidity",
            Self::AirQuality => "Air Quality",
            Self::FanRpm => "Fan Speed",
        }
    }

    /// Unit of measurement.
    #[must_use]
    pub const fn unit(&self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Humidity => "%",
            Self::AirQuality => "µg/m³",
            Self::FanRpm => "RPM",
        }
    }

    /// Extracts this reading from a snapshot.
    #[must_use]
    pub fn read(&self, state: &DeviceState) -> f64 {
        match self {
            Self::Temperature => state.temperature_c(),
            Self::Humidity => state.humidity_pct(),
            Self::AirQuality => state.pm25(),
            Self::FanRpm => f64::from(state.fan_rpm()),
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One numeric reading of the device.
#[derive(Debug)]
pub struct SensorView {
    info: EntityInfo,
    kind: SensorKind,
    last: LastState,
}

impl SensorView {
    /// Creates a view of `kind` with the given identity.
    #[must_use]
    pub fn new(kind: SensorKind, info: EntityInfo) -> Self {
        Self {
            info,
            kind,
            last: LastState::new(),
        }
    }

    /// Returns the entity identity.
    #[must_use]
    pub fn info(&self) -> &EntityInfo {
        &self.info
    }

    /// Returns which reading this view exposes.
    #[must_use]
    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Returns the unit of measurement.
    #[must_use]
    pub fn unit(&self) -> &'static str {
        self.kind.unit()
    }

    /// Latest reading. `None` until the device has reported once.
    ///
    /// While the device is unreachable this is the last known value;
    /// check [`is_available`](Observer::is_available) before trusting it.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        self.last
            .map(|state| (!state.is_unknown()).then(|| self.kind.read(state)))?
    }
}

impl Observer for SensorView {
    fn on_state_changed(&self, state: &DeviceState) {
        self.last.store(state);
    }

    fn is_available(&self) -> bool {
        self.last.connected()
    }
}

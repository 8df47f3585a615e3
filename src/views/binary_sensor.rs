// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! On/off views.

use crate::observer::{LastState, Observer};
use crate::state::DeviceState;

use super::EntityInfo;

/// Which flag a [`BinarySensorView`] follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryKind {
    /// Follows `power`.
    Power,
    /// Follows `connected`.
    Connectivity,
}

impl BinaryKind {
    /// Every kind, in registration order.
    pub const ALL: [Self; 2] = [Self::Power, Self::Connectivity];

    /// Suffix of the unique id.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Connectivity => "connected",
        }
    }

    /// Suffix of the display name.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Power => "Power",
            Self::Connectivity => "Connected",
        }
    }
}

/// A boolean flag of the device.
///
/// The connectivity sensor is itself always available: reporting "not
/// connected" is its job.
#[derive(Debug)]
pub struct BinarySensorView {
    info: EntityInfo,
    kind: BinaryKind,
    last: LastState,
}

impl BinarySensorView {
    /// Creates a view of `kind` with the given identity.
    #[must_use]
    pub fn new(kind: BinaryKind, info: EntityInfo) -> Self {
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

    /// Returns which flag this view follows.
    #[must_use]
    pub fn kind(&self) -> BinaryKind {
        self.kind
    }

    /// Current value of the flag.
    #[must_use]
    pub fn is_on(&self) -> bool {
        match self.kind {
            BinaryKind::Power => self.last.map(DeviceState::power).unwrap_or(false),
            BinaryKind::Connectivity => self.last.connected(),
        }
    }
}

impl Observer for BinarySensorView {
    fn on_state_changed(&self, state: &DeviceState) {
        self.last.store(state);
    }

    fn is_available(&self) -> bool {
        match self.kind {
            BinaryKind::Power => self.last.connected(),
            BinaryKind::Connectivity => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn view(kind: BinaryKind) -> BinarySensorView {
        BinarySensorView::new(kind, EntityInfo::new(kind.label(), kind.key()))
    }

    #[test]
    fn power_follows_power_flag() {
        let power = view(BinaryKind::Power);
        assert!(!power.is_on());
        assert!(!power.is_available());

        power.on_state_changed(&DeviceState::new().with_power(true).connected_at(Utc::now()));
        assert!(power.is_on());
        assert!(power.is_available());
    }

    #[test]
    fn connectivity_is_always_available() {
        let connectivity = view(BinaryKind::Connectivity);
        assert!(connectivity.is_available());
        assert!(!connectivity.is_on());

        let online = DeviceState::new().connected_at(Utc::now());
        connectivity.on_state_changed(&online);
        assert!(connectivity.is_on());

        connectivity.on_state_changed(&online.disconnected());
        assert!(!connectivity.is_on());
        assert!(connectivity.is_available());
    }
}

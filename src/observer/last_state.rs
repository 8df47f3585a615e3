// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Storage for the most recently delivered snapshot.

use parking_lot::RwLock;

use crate::state::DeviceState;

/// The most recently delivered [`DeviceState`], shared between the
/// notifying coordinator and readers of a view.
///
/// Before the first delivery it holds nothing, and a view built on it
/// reports unavailable.
#[derive(Debug, Default)]
pub struct LastState {
    state: RwLock<Option<DeviceState>>,
}

impl LastState {
    /// Creates an empty holder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the held snapshot.
    pub fn store(&self, state: &DeviceState) {
        *self.state.write() = Some(state.clone());
    }

    /// Returns a copy of the held snapshot.
    #[must_use]
    pub fn get(&self) -> Option<DeviceState> {
        self.state.read().clone()
    }

    /// Reads a value out of the held snapshot without cloning it.
    pub fn map<R>(&self, f: impl FnOnce(&DeviceState) -> R) -> Option<R> {
        self.state.read().as_ref().map(f)
    }

    /// Returns the `connected` flag of the held snapshot (`false` if none).
    #[must_use]
    pub fn connected(&self) -> bool {
        self.map(DeviceState::connected).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_not_connected() {
        let last = LastState::new();
        assert!(last.get().is_none());
        assert!(!last.connected());
    }

    #[test]
    fn store_replaces_snapshot() {
        let last = LastState::new();
        last.store(&DeviceState::new().with_fan_rpm(100));
        last.store(&DeviceState::new().with_fan_rpm(200));
        assert_eq!(last.map(DeviceState::fan_rpm), Some(200));
    }
}

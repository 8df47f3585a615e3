// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state snapshot types.
//!
//! The [`DeviceState`] struct is an immutable snapshot of everything the fan
//! reports. The coordinator replaces it wholesale on every refresh; the
//! field-level differences between two snapshots are described by
//! [`StateChange`].
//!
//! # Examples
//!
//! ```
//! use blowcontrol::state::{DeviceState, StateChange};
//! use blowcontrol::types::Speed;
//!
//! let before = DeviceState::new();
//! let after = before.clone().with_power(true).with_speed(Speed::HIGH);
//!
//! let changes = before.diff(&after);
//! assert!(changes.contains(&StateChange::Power(true)));
//! assert!(changes.contains(&StateChange::Speed(Speed::HIGH)));
//! ```

mod device_state;
mod state_change;

pub use device_state::DeviceState;
pub use state_change::StateChange;

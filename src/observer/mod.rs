// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observer capability and registration.
//!
//! Any consumer of device state implements [`Observer`] and registers with
//! a [`Coordinator`](crate::Coordinator). The coordinator delivers every
//! state transition to every registered observer before the operation that
//! caused it returns.
//!
//! # Overview
//!
//! - [`Observer`] - The two-operation capability every view implements
//! - [`ObserverRegistry`] - Thread-safe set of registered observers
//! - [`SubscriptionId`] - Identifier returned on registration
//! - [`LastState`] - Helper holding the most recently delivered snapshot
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use blowcontrol::observer::{LastState, Observer, ObserverRegistry};
//! use blowcontrol::state::DeviceState;
//!
//! #[derive(Default)]
//! struct Logger {
//!     last: LastState,
//! }
//!
//! impl Observer for Logger {
//!     fn on_state_changed(&self, state: &DeviceState) {
//!         self.last.store(state);
//!     }
//!
//!     fn is_available(&self) -> bool {
//!         self.last.connected()
//!     }
//! }
//!
//! let registry = ObserverRegistry::new();
//! let logger: Arc<dyn Observer> = Arc::new(Logger::default());
//!
//! let id = registry.subscribe(Arc::clone(&logger));
//! // Subscribing the same observer again is a no-op
//! assert_eq!(registry.subscribe(Arc::clone(&logger)), id);
//! assert_eq!(registry.len(), 1);
//! ```

mod last_state;
mod registry;

pub use last_state::LastState;
pub use registry::{ObserverRegistry, SubscriptionId};

use crate::state::DeviceState;

/// A consumer of device state.
///
/// Implementations must be cheap: `on_state_changed` is called while the
/// coordinator holds its device-access slot, so it must not block or
/// perform device I/O.
pub trait Observer: Send + Sync {
    /// Receives a new snapshot.
    ///
    /// The same logical state may be delivered more than once, and the
    /// first delivery may be the initial unknown state; both must be
    /// handled as an idempotent re-render.
    fn on_state_changed(&self, state: &DeviceState);

    /// Reports whether the observer's data is usable.
    ///
    /// Must be derived from the `connected` flag of the most recently
    /// delivered state, never cached independently of it.
    fn is_available(&self) -> bool;
}

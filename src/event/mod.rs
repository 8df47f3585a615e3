// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Diagnostic event stream.
//!
//! Every refresh outcome and command attempt is published as a
//! [`CoordinatorEvent`] on an [`EventBus`] backed by tokio's broadcast
//! channel. The stream is for logging and monitoring only: observers are
//! notified synchronously through [`Observer`](crate::observer::Observer),
//! never through this bus.
//!
//! # Examples
//!
//! ```
//! use blowcontrol::event::{CoordinatorEvent, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(CoordinatorEvent::Closed);
//! assert!(matches!(rx.try_recv(), Ok(CoordinatorEvent::Closed)));
//! ```

mod coordinator_event;
mod event_bus;

pub use coordinator_event::CoordinatorEvent;
pub use event_bus::EventBus;

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `blowcontrol` - polling state coordination for BlowControl fans.
//!
//! A [`Coordinator`] polls one fan through a [`DeviceTransport`] on a
//! fixed interval, keeps the authoritative [`DeviceState`] snapshot, and
//! pushes every new snapshot to a set of [`Observer`]s. Control commands
//! go through the same coordinator, which serializes them with refreshes
//! and confirms their effect before returning.
//!
//! # Features
//!
//! - **Polling**: one fetch per interval, bounded by a timeout
//! - **Degradation**: on failure, last known values are kept and marked
//!   disconnected
//! - **Commands**: power, speed, oscillation and direction, each followed
//!   by a confirmation refresh
//! - **Views**: fan, measurement and binary sensor observers sharing one
//!   coordinator
//! - **Diagnostics**: structured `tracing` logs and a broadcast event
//!   stream
//!
//! # Quick Start
//!
//! ```no_run
//! use blowcontrol::config::DeviceConfig;
//! use blowcontrol::transport::CliTransport;
//! use blowcontrol::views::register_views;
//! use blowcontrol::Coordinator;
//!
//! #[tokio::main]
//! async fn main() -> blowcontrol::Result<()> {
//!     let config = DeviceConfig::new("192.168.1.100")
//!         .with_serial_number("ABC-123")
//!         .with_mqtt_password("secret");
//!     let name = config.name().to_string();
//!
//!     let coordinator = Coordinator::builder(CliTransport::new(config)).build();
//!     let views = register_views(&coordinator, &name, "living_room");
//!     coordinator.start();
//!
//!     views.fan.turn_on(Some(50)).await?;
//!
//!     coordinator.close().await;
//!     Ok(())
//! }
//! ```
//!
//! # Testing without a device
//!
//! [`MockTransport`](transport::MockTransport) replays scripted replies and
//! simulates a fan, so the whole stack can run in tests:
//!
//! ```
//! use blowcontrol::state::DeviceState;
//! use blowcontrol::transport::MockTransport;
//! use blowcontrol::types::Speed;
//! use blowcontrol::Coordinator;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> blowcontrol::Result<()> {
//! let device = DeviceState::new().with_power(true).with_speed(Speed::LOW);
//! let coordinator = Coordinator::builder(MockTransport::new().with_device(device)).build();
//!
//! let state = coordinator.refresh().await?;
//! assert!(state.connected());
//! assert_eq!(state.speed(), Speed::LOW);
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod event;
pub mod observer;
pub mod state;
pub mod transport;
pub mod types;
pub mod views;

pub use command::FanCommand;
pub use config::{CoordinatorConfig, DeviceConfig};
pub use coordinator::{CommandOutcome, Coordinator, CoordinatorBuilder, Lifecycle};
pub use error::{Error, FailureKind, Result, TransportError, ValueError};
pub use event::{CoordinatorEvent, EventBus};
pub use observer::{Observer, SubscriptionId};
pub use state::{DeviceState, StateChange};
pub use transport::DeviceTransport;
pub use types::{Direction, PowerState, Speed};

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device transports.
//!
//! A transport performs exactly one round-trip per call against the
//! physical fan. The coordinator never builds or parses wire messages; it
//! only invokes [`DeviceTransport::fetch`] and
//! [`DeviceTransport::send_command`] and reacts to their outcomes.
//!
//! # Implementations
//!
//! - [`CliTransport`]: drives the `blowcontrol` command-line tool (feature `cli`)
//! - [`MockTransport`]: scripted responses for tests and demos

#[cfg(feature = "cli")]
mod cli;
mod mock;

#[cfg(feature = "cli")]
pub use cli::CliTransport;
pub use mock::{MockReply, MockTransport};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::command::FanCommand;
use crate::error::TransportError;
use crate::state::DeviceState;

/// One-shot access to the physical device.
///
/// Implementations should honour `timeout` themselves; the coordinator also
/// bounds every call by the same duration and reports
/// [`TransportError::Timeout`] if it is exceeded.
///
/// The `connected` and `last_seen` fields of a fetched state are ignored;
/// the coordinator sets them.
pub trait DeviceTransport: Send + Sync + 'static {
    /// Reads the current device state.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Timeout` if the device did not answer in
    /// time, or `TransportError::Communication` for any other failure.
    fn fetch(
        &self,
        timeout: Duration,
    ) -> impl Future<Output = Result<DeviceState, TransportError>> + Send;

    /// Sends a command without waiting for the resulting state.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Timeout` if the device did not acknowledge in
    /// time, or `TransportError::Communication` for any other failure.
    fn send_command(
        &self,
        command: FanCommand,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Releases any resource held by the transport.
    fn close(&self) -> impl Future<Output = ()> + Send {
        async {}
    }
}

impl<T: DeviceTransport> DeviceTransport for Arc<T> {
    fn fetch(
        &self,
        timeout: Duration,
    ) -> impl Future<Output = Result<DeviceState, TransportError>> + Send {
        T::fetch(self, timeout)
    }

    fn send_command(
        &self,
        command: FanCommand,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), TransportError>> + Send {
        T::send_command(self, command, timeout)
    }

    fn close(&self) -> impl Future<Output = ()> + Send {
        T::close(self)
    }
}

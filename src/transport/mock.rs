// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scripted in-memory transport.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::command::FanCommand;
use crate::error::TransportError;
use crate::state::DeviceState;

use super::DeviceTransport;

/// A scripted reply for one transport call.
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply<T> {
    /// Succeed with the value.
    Ok(T),
    /// Fail with the error.
    Err(TransportError),
    /// Never answer; the caller's timeout decides the outcome.
    Hang,
}

impl<T> From<Result<T, TransportError>> for MockReply<T> {
    fn from(result: Result<T, TransportError>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(err) => Self::Err(err),
        }
    }
}

/// Transport that replays scripted replies and simulates a device.
///
/// Scripted replies are consumed first, in order. When the fetch script is
/// empty, the simulated device state is returned; successful commands with
/// no scripted reply are applied to that simulated state, so a subsequent
/// fetch observes them the way a real device would.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use blowcontrol::command::FanCommand;
/// use blowcontrol::state::DeviceState;
/// use blowcontrol::transport::{DeviceTransport, MockTransport};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let transport = MockTransport::new().with_device(DeviceState::new());
/// let timeout = Duration::from_secs(1);
///
/// transport.send_command(FanCommand::SetPower(true), timeout).await.unwrap();
/// let state = transport.fetch(timeout).await.unwrap();
///
/// assert!(state.power());
/// assert_eq!(transport.fetch_count(), 1);
/// assert_eq!(transport.commands(), vec![FanCommand::SetPower(true)]);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    fetch_script: Mutex<VecDeque<MockReply<DeviceState>>>,
    command_script: Mutex<VecDeque<MockReply<()>>>,
    device: Mutex<Option<DeviceState>>,
    latency: Mutex<Duration>,
    commands: Mutex<Vec<FanCommand>>,
    fetch_count: AtomicUsize,
    command_count: AtomicUsize,
    closed: AtomicBool,
}

impl MockTransport {
    /// Creates a transport with no device and no scripted replies.
    ///
    /// Fetching from it fails with a communication error until a device or
    /// a reply is supplied.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the simulated device state.
    #[must_use]
    pub fn with_device(self, state: DeviceState) -> Self {
        *self.device.lock() = Some(state);
        self
    }

    /// Sets an artificial delay applied before every reply.
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock() = latency;
        self
    }

    /// Queues a reply for the next unscripted fetch.
    pub fn push_fetch(&self, reply: impl Into<MockReply<DeviceState>>) {
        self.fetch_script.lock().push_back(reply.into());
    }

    /// Queues a fetch that never answers.
    pub fn push_fetch_hang(&self) {
        self.fetch_script.lock().push_back(MockReply::Hang);
    }

    /// Queues a reply for the next unscripted command.
    pub fn push_command(&self, reply: impl Into<MockReply<()>>) {
        self.command_script.lock().push_back(reply.into());
    }

    /// Replaces the simulated device state, as an external agent would.
    pub fn set_device(&self, state: DeviceState) {
        *self.device.lock() = Some(state);
    }

    /// Returns the simulated device state.
    #[must_use]
    pub fn device(&self) -> Option<DeviceState> {
        self.device.lock().clone()
    }

    /// Returns how many fetches were issued.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Returns how many commands were issued.
    #[must_use]
    pub fn command_count(&self) -> usize {
        self.command_count.load(Ordering::SeqCst)
    }

    /// Returns every command issued, in order.
    #[must_use]
    pub fn commands(&self) -> Vec<FanCommand> {
        self.commands.lock().clone()
    }

    /// Returns `true` once [`DeviceTransport::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn delay(&self) {
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    fn apply(&self, command: FanCommand) {
        let mut device = self.device.lock();
        if let Some(state) = device.take() {
            *device = Some(match command {
                FanCommand::SetPower(on) => state.with_power(on),
                FanCommand::SetSpeed(speed) => state.with_speed(speed),
                FanCommand::SetOscillating(on) => state.with_oscillating(on),
                FanCommand::SetDirection(direction) => state.with_direction(direction),
            });
        }
    }
}

impl DeviceTransport for MockTransport {
    async fn fetch(&self, _timeout: Duration) -> Result<DeviceState, TransportError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let scripted = self.fetch_script.lock().pop_front();
        self.delay().await;

        match scripted {
            Some(MockReply::Ok(state)) => Ok(state),
            Some(MockReply::Err(err)) => Err(err),
            Some(MockReply::Hang) => std::future::pending().await,
            None => self
                .device
                .lock()
                .clone()
                .ok_or_else(|| TransportError::communication("no simulated device")),
        }
    }

    async fn send_command(
        &self,
        command: FanCommand,
        _timeout: Duration,
    ) -> Result<(), TransportError> {
        self.command_count.fetch_add(1, Ordering::SeqCst);
        self.commands.lock().push(command);
        let scripted = self.command_script.lock().pop_front();
        self.delay().await;

        match scripted {
            Some(MockReply::Ok(())) => Ok(()),
            Some(MockReply::Err(err)) => Err(err),
            Some(MockReply::Hang) => std::future::pending().await,
            None => {
                self.apply(command);
                Ok(())
            }
        }
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

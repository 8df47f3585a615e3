// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinator builder.

use std::time::Duration;

use crate::config::CoordinatorConfig;
use crate::event::EventBus;
use crate::transport::DeviceTransport;

use super::Coordinator;

/// Builder for a [`Coordinator`].
///
/// Created with [`Coordinator::builder`]. Every setting has a default, so
/// `Coordinator::builder(transport).build()` is a complete configuration.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use blowcontrol::Coordinator;
/// use blowcontrol::transport::MockTransport;
///
/// let coordinator = Coordinator::builder(MockTransport::new())
///     .with_poll_interval(Duration::from_secs(15))
///     .with_timeout(Duration::from_secs(5))
///     .build();
///
/// assert_eq!(coordinator.config().staleness(), Duration::from_secs(45));
/// ```
#[derive(Debug)]
pub struct CoordinatorBuilder<T> {
    transport: T,
    config: CoordinatorConfig,
    event_capacity: usize,
}

impl<T: DeviceTransport> CoordinatorBuilder<T> {
    pub(super) fn new(transport: T) -> Self {
        Self {
            transport,
            config: CoordinatorConfig::default(),
            event_capacity: EventBus::DEFAULT_CAPACITY,
        }
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the interval between scheduled refreshes.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config = self.config.with_poll_interval(interval);
        self
    }

    /// Sets the bound applied to every transport call.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    /// Sets how long after the last success the device stays available.
    #[must_use]
    pub fn with_staleness(mut self, staleness: Duration) -> Self {
        self.config = self.config.with_staleness(staleness);
        self
    }

    /// Sets how many events a slow event subscriber may lag behind.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Builds the coordinator in the `Created` state.
    ///
    /// No I/O happens until [`Coordinator::start`] or an explicit refresh.
    #[must_use]
    pub fn build(self) -> Coordinator<T> {
        Coordinator::from_parts(
            self.transport,
            self.config,
            EventBus::with_capacity(self.event_capacity),
        )
    }
}

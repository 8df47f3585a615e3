// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast channel carrying [`CoordinatorEvent`]s.

use tokio::sync::broadcast;

use super::CoordinatorEvent;

/// Fan-out channel for coordinator diagnostics.
///
/// Publishing never blocks, so it is safe while the coordinator holds its
/// device-access slot. A receiver that falls more than the capacity behind
/// gets `RecvError::Lagged` and skips the oldest events; the coordinator is
/// never slowed down by it.
///
/// Clones share the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoordinatorEvent>,
}

impl EventBus {
    /// Buffered events per receiver when no capacity is given.
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Creates a bus with [`DEFAULT_CAPACITY`](Self::DEFAULT_CAPACITY).
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` events per receiver.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns a receiver for events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of live receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event. Without receivers the event is dropped.
    pub fn publish(&self, event: CoordinatorEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("No event subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

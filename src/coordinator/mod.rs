// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The polling state coordinator.
//!
//! A [`Coordinator`] owns one device's transport and the authoritative
//! [`DeviceState`] snapshot. It refreshes the snapshot on a fixed interval,
//! serializes every device round-trip, and pushes each new snapshot to the
//! registered [`Observer`]s.
//!
//! # Concurrency
//!
//! - At most one transport operation runs at a time. A command holds the
//!   device for both its write and the confirmation fetch that follows.
//! - Concurrent refresh requests share one fetch: everyone waiting receives
//!   the same outcome.
//! - Observers are notified exactly once per completed refresh, in
//!   completion order, after the snapshot has been replaced.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use blowcontrol::Coordinator;
//! use blowcontrol::state::DeviceState;
//! use blowcontrol::transport::MockTransport;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> blowcontrol::Result<()> {
//! let transport = MockTransport::new().with_device(DeviceState::new());
//! let coordinator = Coordinator::builder(transport)
//!     .with_poll_interval(Duration::from_secs(30))
//!     .build();
//!
//! coordinator.start();
//!
//! let outcome = coordinator.set_speed(3).await?;
//! assert!(outcome.is_confirmed());
//! assert_eq!(coordinator.state().speed().value(), 3);
//!
//! coordinator.close().await;
//! # Ok(())
//! # }
//! ```

mod builder;
mod lifecycle;
mod outcome;
mod poller;
mod shared;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::command::FanCommand;
use crate::config::CoordinatorConfig;
use crate::error::{FailureKind, Result};
use crate::event::{CoordinatorEvent, EventBus};
use crate::observer::{Observer, SubscriptionId};
use crate::state::DeviceState;
use crate::transport::DeviceTransport;
use crate::types::{Direction, Speed};

pub use builder::CoordinatorBuilder;
pub use lifecycle::Lifecycle;
pub use outcome::CommandOutcome;

use shared::Shared;

/// Smallest poll interval the timer accepts.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a polling state coordinator.
///
/// Handles are cheap to clone and all refer to the same coordinator. The
/// poll task only holds a weak reference, so dropping every handle without
/// calling [`close`](Self::close) still stops polling at the next tick;
/// closing explicitly is what releases the transport.
pub struct Coordinator<T: DeviceTransport> {
    shared: Arc<Shared<T>>,
}

impl<T: DeviceTransport> Clone for Coordinator<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: DeviceTransport> Coordinator<T> {
    /// Creates a coordinator with the given configuration.
    #[must_use]
    pub fn new(transport: T, config: CoordinatorConfig) -> Self {
        Self::builder(transport).with_config(config).build()
    }

    /// Starts building a coordinator around `transport`.
    #[must_use]
    pub fn builder(transport: T) -> CoordinatorBuilder<T> {
        CoordinatorBuilder::new(transport)
    }

    fn from_parts(transport: T, config: CoordinatorConfig, events: EventBus) -> Self {
        Self {
            shared: Arc::new(Shared::new(transport, config, events)),
        }
    }

    // ========== Lifecycle ==========

    /// Starts the poll timer.
    ///
    /// The first refresh is issued immediately, then one per poll interval.
    /// Calling this on a coordinator that is not in `Created` does nothing.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start(&self) {
        let started = self.shared.lifecycle.send_if_modified(|state| {
            if *state == Lifecycle::Created {
                *state = Lifecycle::Running;
                true
            } else {
                false
            }
        });

        if !started {
            tracing::debug!(lifecycle = %self.lifecycle(), "Coordinator already started");
            return;
        }

        let interval = self.shared.config.poll_interval().max(MIN_POLL_INTERVAL);
        let handle = tokio::spawn(poller::run(
            Arc::downgrade(&self.shared),
            self.shared.lifecycle.subscribe(),
            interval,
        ));
        *self.shared.poller.lock() = Some(handle);

        tracing::info!(interval_ms = interval.as_millis(), "Coordinator started");
    }

    /// Stops polling and releases the transport.
    ///
    /// Waits for the refresh or command in progress, if any, to finish.
    /// Operations requested after closing began fail with
    /// [`Error::Closed`](crate::Error::Closed). All observers are
    /// unsubscribed. Calling `close` again, or concurrently, waits for the
    /// first call to complete and has no further effect.
    pub async fn close(&self) {
        self.shared.close().await;
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.shared.lifecycle()
    }

    // ========== Refresh ==========

    /// Fetches the device state now.
    ///
    /// If a refresh is already in progress this waits for it and returns
    /// its outcome instead of issuing another fetch.
    ///
    /// On failure the snapshot keeps its last known values with
    /// `connected == false`, observers are notified, and the failure is
    /// returned for the caller to inspect. Scheduled refreshes report
    /// failures only through logs and events.
    ///
    /// # Errors
    ///
    /// - [`Error::Transport`](crate::Error::Transport) if the fetch timed
    ///   out or failed
    /// - [`Error::Closed`](crate::Error::Closed) once closing has begun
    pub async fn refresh(&self) -> Result<DeviceState> {
        self.shared.ensure_open()?;
        self.shared.refresh().await
    }

    // ========== Commands ==========

    /// Turns the fan on or off.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn set_power(&self, on: bool) -> Result<CommandOutcome> {
        self.send(FanCommand::SetPower(on)).await
    }

    /// Sets the speed level, `0..=4`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument)
    /// without contacting the device if `level` is above
    /// [`Speed::MAX_LEVEL`]. Otherwise see [`send`](Self::send).
    pub async fn set_speed(&self, level: u8) -> Result<CommandOutcome> {
        let speed = Speed::new(level)?;
        self.send(FanCommand::SetSpeed(speed)).await
    }

    /// Enables or disables oscillation.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn set_oscillating(&self, on: bool) -> Result<CommandOutcome> {
        self.send(FanCommand::SetOscillating(on)).await
    }

    /// Sets the airflow direction.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn set_direction(&self, direction: Direction) -> Result<CommandOutcome> {
        self.send(FanCommand::SetDirection(direction)).await
    }

    /// Sends a command and confirms the resulting state.
    ///
    /// The command waits for any refresh or command in progress. Once the
    /// device accepts it, a confirmation fetch runs before the device is
    /// released, and observers see its result. If that fetch fails the
    /// command still counts as delivered and the outcome is
    /// [`CommandOutcome::Unconfirmed`].
    ///
    /// # Errors
    ///
    /// - [`Error::CommandFailed`](crate::Error::CommandFailed) if the device
    ///   did not accept the command; the snapshot is left untouched
    /// - [`Error::Closed`](crate::Error::Closed) once closing has begun
    pub async fn send(&self, command: FanCommand) -> Result<CommandOutcome> {
        self.shared.execute(command).await
    }

    // ========== Observers ==========

    /// Registers an observer for snapshot updates.
    ///
    /// Registering an observer that is already registered returns its
    /// existing id. The observer receives the next completed refresh; read
    /// [`state`](Self::state) for the current snapshot.
    pub fn subscribe(&self, observer: Arc<dyn Observer>) -> SubscriptionId {
        self.shared.observers.subscribe(observer)
    }

    /// Removes an observer by id. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.observers.unsubscribe(id)
    }

    /// Removes an observer by identity. Returns `false` if it was not
    /// registered.
    pub fn unsubscribe_observer(&self, observer: &Arc<dyn Observer>) -> bool {
        self.shared.observers.unsubscribe_observer(observer)
    }

    /// Returns the number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.shared.observers.len()
    }

    // ========== Queries ==========

    /// Returns a copy of the current snapshot.
    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.shared.snapshot.read().state.clone()
    }

    /// Whether the device should be presented as available.
    ///
    /// True when the last refresh succeeded and it happened less than the
    /// staleness threshold ago.
    #[must_use]
    pub fn available(&self) -> bool {
        self.shared.available()
    }

    /// Returns the number of failed refreshes since the last success.
    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.shared.snapshot.read().consecutive_failures
    }

    /// Returns the classification of the most recent failed refresh.
    ///
    /// Kept after a later success, for diagnostics.
    #[must_use]
    pub fn last_failure(&self) -> Option<FailureKind> {
        self.shared.snapshot.read().last_failure
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.shared.config
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.shared.transport
    }

    /// Subscribes to the diagnostic event stream.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.shared.events.subscribe()
    }
}

impl<T: DeviceTransport> fmt::Debug for Coordinator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.shared.snapshot.read();
        f.debug_struct("Coordinator")
            .field("lifecycle", &self.lifecycle())
            .field("config", &self.shared.config)
            .field("state", &snapshot.state)
            .field("consecutive_failures", &snapshot.consecutive_failures)
            .field("observers", &self.shared.observers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;
    use crate::error::{Error, TransportError, ValueError};
    use crate::transport::{MockReply, MockTransport};

    const TIMEOUT: Duration = Duration::from_secs(10);
    const INTERVAL: Duration = Duration::from_secs(30);

    fn device() -> DeviceState {
        DeviceState::new()
            .with_power(true)
            .with_speed(Speed::MEDIUM)
            .with_temperature_c(22.5)
            .with_humidity_pct(45.2)
            .with_pm25(12.3)
            .with_fan_rpm(1200)
    }

    fn coordinator(transport: MockTransport) -> Coordinator<Arc<MockTransport>> {
        Coordinator::builder(Arc::new(transport))
            .with_poll_interval(INTERVAL)
            .with_timeout(TIMEOUT)
            .build()
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<DeviceState>>,
    }

    impl Observer for Recorder {
        fn on_state_changed(&self, state: &DeviceState) {
            self.seen.lock().push(state.clone());
        }

        fn is_available(&self) -> bool {
            self.seen.lock().last().is_some_and(DeviceState::connected)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_replaces_snapshot_and_notifies_once() {
        let coordinator = coordinator(MockTransport::new().with_device(device()));
        let recorder = Arc::new(Recorder::default());
        coordinator.subscribe(recorder.clone());

        assert!(!coordinator.available());
        let state = coordinator.refresh().await.unwrap();

        assert!(state.connected());
        assert!(state.last_seen().is_some());
        assert_eq!(coordinator.state(), state);
        assert!(coordinator.available());
        assert_eq!(recorder.seen.lock().as_slice(), &[state]);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_refreshes_share_one_fetch() {
        let transport = MockTransport::new()
            .with_device(device())
            .with_latency(Duration::from_secs(1));
        let coordinator = coordinator(transport);
        let notified = Arc::new(Recorder::default());
        coordinator.subscribe(notified.clone());

        let (a, b) = tokio::join!(coordinator.refresh(), coordinator.refresh());

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(coordinator.transport().fetch_count(), 1);
        assert_eq!(notified.seen.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_keeps_fields_and_marks_disconnected() {
        let transport = MockTransport::new().with_device(device());
        let coordinator = coordinator(transport);
        let before = coordinator.refresh().await.unwrap();

        coordinator.transport().push_fetch_hang();
        let err = coordinator.refresh().await.unwrap_err();

        assert_eq!(err, Error::Transport(TransportError::timeout(TIMEOUT)));
        let after = coordinator.state();
        assert!(!after.connected());
        assert!(after.same_readings(&before));
        assert_eq!(after.last_seen(), before.last_seen());
        assert_eq!(coordinator.consecutive_failures(), 1);
        assert_eq!(coordinator.last_failure(), Some(FailureKind::Timeout));
        assert!(!coordinator.available());
    }

    #[tokio::test(start_paused = true)]
    async fn success_after_failure_resets_counter() {
        let transport = MockTransport::new().with_device(device());
        transport.push_fetch(Err(TransportError::communication("refused")));
        transport.push_fetch(Err(TransportError::communication("refused")));
        let coordinator = coordinator(transport);

        assert!(coordinator.refresh().await.is_err());
        assert!(coordinator.refresh().await.is_err());
        assert_eq!(coordinator.consecutive_failures(), 2);

        coordinator.refresh().await.unwrap();
        assert_eq!(coordinator.consecutive_failures(), 0);
        assert_eq!(
            coordinator.last_failure(),
            Some(FailureKind::CommunicationError)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_speed_never_reaches_transport() {
        let coordinator = coordinator(MockTransport::new().with_device(device()));

        let err = coordinator.set_speed(7).await.unwrap_err();

        assert_eq!(
            err,
            Error::InvalidArgument(ValueError::OutOfRange {
                min: 0,
                max: 4,
                actual: 7
            })
        );
        assert_eq!(coordinator.transport().command_count(), 0);
        assert_eq!(coordinator.transport().fetch_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn command_confirms_with_fresh_state() {
        let coordinator = coordinator(MockTransport::new().with_device(device()));
        let recorder = Arc::new(Recorder::default());
        coordinator.subscribe(recorder.clone());

        let outcome = coordinator.set_direction(Direction::Reverse).await.unwrap();

        let confirmed = outcome.state().unwrap();
        assert_eq!(confirmed.direction(), Direction::Reverse);
        assert_eq!(coordinator.state().direction(), Direction::Reverse);
        assert_eq!(coordinator.transport().fetch_count(), 1);
        assert_eq!(recorder.seen.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_command_leaves_state_untouched() {
        let coordinator = coordinator(MockTransport::new().with_device(device()));
        let before = coordinator.refresh().await.unwrap();
        let recorder = Arc::new(Recorder::default());
        coordinator.subscribe(recorder.clone());

        coordinator
            .transport()
            .push_command(MockReply::Err(TransportError::communication("refused")));
        let err = coordinator.set_power(false).await.unwrap_err();

        assert!(matches!(err, Error::CommandFailed { .. }));
        assert_eq!(err.failure_kind(), Some(FailureKind::CommunicationError));
        assert_eq!(coordinator.state(), before);
        assert_eq!(coordinator.transport().fetch_count(), 1);
        assert!(recorder.seen.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_confirmation_is_reported_separately() {
        let coordinator = coordinator(MockTransport::new().with_device(device()));
        coordinator.refresh().await.unwrap();

        coordinator
            .transport()
            .push_fetch(Err(TransportError::communication("garbled")));
        let outcome = coordinator.set_oscillating(true).await.unwrap();

        assert!(!outcome.is_confirmed());
        assert!(matches!(
            outcome.confirmation_error(),
            Some(Error::ConfirmationFailed { .. })
        ));
        assert!(!coordinator.state().connected());
        assert_eq!(coordinator.transport().command_count(), 1);
        // Delivered even though unconfirmed
        assert!(coordinator.transport().device().unwrap().oscillating());
    }

    #[tokio::test(start_paused = true)]
    async fn poll_loop_refreshes_on_interval() {
        let coordinator = coordinator(MockTransport::new().with_device(device()));
        coordinator.start();
        assert_eq!(coordinator.lifecycle(), Lifecycle::Running);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(coordinator.transport().fetch_count(), 1);

        tokio::time::sleep(INTERVAL * 2).await;
        assert_eq!(coordinator.transport().fetch_count(), 3);

        coordinator.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn start_twice_spawns_one_loop() {
        let coordinator = coordinator(MockTransport::new().with_device(device()));
        coordinator.start();
        coordinator.start();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(coordinator.transport().fetch_count(), 1);
        coordinator.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn close_is_idempotent_and_rejects_later_calls() {
        let coordinator = coordinator(MockTransport::new().with_device(device()));
        coordinator.start();
        coordinator.subscribe(Arc::new(Recorder::default()));

        coordinator.close().await;
        coordinator.close().await;

        assert_eq!(coordinator.lifecycle(), Lifecycle::Closed);
        assert!(coordinator.transport().is_closed());
        assert_eq!(coordinator.observer_count(), 0);
        assert_eq!(coordinator.refresh().await, Err(Error::Closed));
        assert_eq!(coordinator.set_power(true).await, Err(Error::Closed));

        let fetches = coordinator.transport().fetch_count();
        tokio::time::sleep(INTERVAL * 3).await;
        assert_eq!(coordinator.transport().fetch_count(), fetches);
    }

    #[tokio::test(start_paused = true)]
    async fn close_waits_for_in_flight_refresh() {
        let transport = MockTransport::new()
            .with_device(device())
            .with_latency(Duration::from_secs(2));
        let coordinator = coordinator(transport);

        let pending = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.refresh().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        coordinator.close().await;

        assert!(pending.await.unwrap().is_ok());
        assert!(coordinator.state().connected());
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_reaching_the_device_after_close_began_is_skipped() {
        let coordinator = coordinator(MockTransport::new().with_device(device()));

        // Admitted just before closing began
        coordinator.shared.lifecycle.send_replace(Lifecycle::Closing);
        let result = coordinator.shared.refresh().await;

        assert_eq!(result, Err(Error::Closed));
        assert_eq!(coordinator.transport().fetch_count(), 0);
        assert!(coordinator.shared.in_flight.lock().is_none());
        assert!(!coordinator.state().connected());
    }

    #[tokio::test(start_paused = true)]
    async fn events_follow_outcomes() {
        let coordinator = coordinator(MockTransport::new().with_device(device()));
        let mut events = coordinator.events();

        coordinator.set_power(false).await.unwrap();
        coordinator.close().await;

        assert_eq!(
            events.recv().await.unwrap(),
            CoordinatorEvent::CommandSent {
                command: FanCommand::SetPower(false)
            }
        );
        assert!(matches!(
            events.recv().await.unwrap(),
            CoordinatorEvent::Refreshed { .. }
        ));
        assert_eq!(events.recv().await.unwrap(), CoordinatorEvent::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn availability_expires_with_staleness() {
        let coordinator = Coordinator::builder(MockTransport::new().with_device(device()))
            .with_staleness(Duration::from_secs(60))
            .build();

        coordinator.refresh().await.unwrap();
        assert!(coordinator.available());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(coordinator.state().connected());
        assert!(!coordinator.available());
    }

    #[tokio::test(start_paused = true)]
    async fn observer_sees_every_refresh_in_order() {
        struct Speeds(Mutex<Vec<u8>>, AtomicUsize);

        impl Observer for Speeds {
            fn on_state_changed(&self, state: &DeviceState) {
                self.0.lock().push(state.speed().value());
                self.1.fetch_add(1, Ordering::SeqCst);
            }

            fn is_available(&self) -> bool {
                true
            }
        }

        let transport = MockTransport::new().with_device(device());
        let coordinator = coordinator(transport);
        let speeds = Arc::new(Speeds(Mutex::new(Vec::new()), AtomicUsize::new(0)));
        coordinator.subscribe(speeds.clone());

        for level in [1, 4, 0] {
            coordinator.set_speed(level).await.unwrap();
        }

        assert_eq!(speeds.0.lock().as_slice(), &[1, 4, 0]);
        assert_eq!(speeds.1.load(Ordering::SeqCst), 3);
    }
}

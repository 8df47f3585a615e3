// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State shared between coordinator handles and the poll task.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{MutexGuard, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::command::FanCommand;
use crate::config::CoordinatorConfig;
use crate::error::{Error, FailureKind, Result, TransportError};
use crate::event::{CoordinatorEvent, EventBus};
use crate::observer::ObserverRegistry;
use crate::state::DeviceState;
use crate::transport::DeviceTransport;

use super::{CommandOutcome, Lifecycle};

/// Outcome of one refresh, shared by every caller waiting on it.
pub(super) type RefreshResult = Result<DeviceState>;

type FetchResult = std::result::Result<DeviceState, TransportError>;

/// Receiver side of an in-flight refresh. `None` until the fetch finishes.
type InFlight = watch::Receiver<Option<RefreshResult>>;

/// Snapshot plus health bookkeeping, replaced together under one lock.
#[derive(Debug)]
pub(super) struct Snapshot {
    pub(super) state: DeviceState,
    pub(super) last_success: Option<Instant>,
    pub(super) consecutive_failures: u32,
    pub(super) last_failure: Option<FailureKind>,
}

impl Snapshot {
    fn new() -> Self {
        Self {
            state: DeviceState::new(),
            last_success: None,
            consecutive_failures: 0,
            last_failure: None,
        }
    }
}

pub(super) struct Shared<T> {
    pub(super) transport: T,
    pub(super) config: CoordinatorConfig,
    /// Device access slot. Held for the whole of a fetch or a command so at
    /// most one transport operation runs at a time.
    pub(super) access: tokio::sync::Mutex<()>,
    pub(super) snapshot: RwLock<Snapshot>,
    pub(super) observers: ObserverRegistry,
    pub(super) in_flight: Mutex<Option<InFlight>>,
    pub(super) lifecycle: watch::Sender<Lifecycle>,
    pub(super) poller: Mutex<Option<JoinHandle<()>>>,
    pub(super) events: EventBus,
}

impl<T: DeviceTransport> Shared<T> {
    pub(super) fn new(transport: T, config: CoordinatorConfig, events: EventBus) -> Self {
        Self {
            transport,
            config,
            access: tokio::sync::Mutex::new(()),
            snapshot: RwLock::new(Snapshot::new()),
            observers: ObserverRegistry::new(),
            in_flight: Mutex::new(None),
            lifecycle: watch::Sender::new(Lifecycle::Created),
            poller: Mutex::new(None),
            events,
        }
    }

    pub(super) fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.borrow()
    }

    pub(super) fn ensure_open(&self) -> Result<()> {
        if self.lifecycle().is_open() {
            Ok(())
        } else {
            Err(Error::Closed)
        }
    }

    pub(super) fn available(&self) -> bool {
        let staleness = self.config.staleness();
        let snapshot = self.snapshot.read();
        snapshot.state.connected()
            && snapshot
                .last_success
                .is_some_and(|at| at.elapsed() < staleness)
    }

    /// Joins the in-flight refresh, or starts one.
    ///
    /// The fetch runs on its own task so a caller that stops waiting does
    /// not cancel it for the others, and `close` can still drain it.
    pub(super) async fn refresh(self: &Arc<Self>) -> RefreshResult {
        let mut pending = {
            let mut slot = self.in_flight.lock();
            if let Some(rx) = slot.as_ref() {
                tracing::trace!("Joining in-flight refresh");
                rx.clone()
            } else {
                let (tx, rx) = watch::channel(None);
                *slot = Some(rx.clone());
                let shared = Arc::clone(self);
                tokio::spawn(async move { shared.run_refresh(tx).await });
                rx
            }
        };

        let outcome = pending
            .wait_for(Option::is_some)
            .await
            .map(|done| done.clone());

        match outcome {
            Ok(Some(result)) => result,
            _ => {
                // The refresh task ended without reporting; free the slot so
                // the next caller starts a fresh fetch.
                let mut slot = self.in_flight.lock();
                if slot.as_ref().is_some_and(|rx| rx.same_channel(&pending)) {
                    slot.take();
                }
                Err(TransportError::communication("refresh ended without a result").into())
            }
        }
    }

    async fn run_refresh(self: Arc<Self>, done: watch::Sender<Option<RefreshResult>>) {
        let access = self.access.lock().await;
        let result = if self.lifecycle().is_open() {
            self.fetch_locked(&access).await.map_err(Error::from)
        } else {
            // The transport may already be released
            tracing::debug!("Skipping refresh, coordinator is closing");
            Err(Error::Closed)
        };
        self.settle(&done, result);
    }

    /// Confirmation fetch for a command holding the access slot. It is
    /// published as the in-flight refresh so `refresh()` callers join it.
    async fn confirm_locked(&self, access: &MutexGuard<'_, ()>) -> FetchResult {
        let (done, pending) = watch::channel(None);
        let published = {
            let mut slot = self.in_flight.lock();
            // A refresh already queued behind the command keeps its turn
            if slot.is_none() {
                *slot = Some(pending);
                true
            } else {
                false
            }
        };

        let result = self.fetch_locked(access).await;
        if published {
            self.settle(&done, result.clone().map_err(Error::from));
        }
        result
    }

    /// Frees the in-flight slot and hands `result` to everyone waiting.
    ///
    /// Runs while the access slot is still held, so a caller arriving after
    /// this starts a new fetch that observes everything applied so far.
    fn settle(&self, done: &watch::Sender<Option<RefreshResult>>, result: RefreshResult) {
        {
            let mut slot = self.in_flight.lock();
            if slot
                .as_ref()
                .is_some_and(|rx| rx.same_channel(&done.subscribe()))
            {
                slot.take();
            }
        }
        done.send_replace(Some(result));
    }

    /// Fetches and applies the result. The caller holds the access slot.
    async fn fetch_locked(&self, _access: &MutexGuard<'_, ()>) -> FetchResult {
        let timeout = self.config.timeout();
        match bounded(timeout, self.transport.fetch(timeout)).await {
            Ok(fetched) => Ok(self.apply_success(fetched)),
            Err(err) => {
                self.apply_failure(&err);
                Err(err)
            }
        }
    }

    fn apply_success(&self, fetched: DeviceState) -> DeviceState {
        let state = fetched.connected_at(Utc::now());
        let changes = {
            let mut snapshot = self.snapshot.write();
            let changes = snapshot.state.diff(&state);
            snapshot.state = state.clone();
            snapshot.last_success = Some(Instant::now());
            snapshot.consecutive_failures = 0;
            changes
        };

        tracing::debug!(changes = changes.len(), "Refresh succeeded");
        self.events.publish(CoordinatorEvent::Refreshed { changes });
        self.observers.notify(&state);
        state
    }

    fn apply_failure(&self, err: &TransportError) {
        let kind = err.kind();
        let (state, consecutive_failures) = {
            let mut snapshot = self.snapshot.write();
            snapshot.state = snapshot.state.disconnected();
            snapshot.consecutive_failures = snapshot.consecutive_failures.saturating_add(1);
            snapshot.last_failure = Some(kind);
            (snapshot.state.clone(), snapshot.consecutive_failures)
        };

        match kind {
            FailureKind::Timeout => tracing::warn!(
                error = %err,
                consecutive_failures,
                "Refresh timed out, keeping last known state"
            ),
            FailureKind::CommunicationError => tracing::warn!(
                error = %err,
                consecutive_failures,
                "Refresh failed, keeping last known state"
            ),
        }

        self.events.publish(CoordinatorEvent::Degraded {
            kind,
            consecutive_failures,
        });
        self.observers.notify(&state);
    }

    /// Sends a command, then confirms the resulting state.
    ///
    /// Both round-trips run under one hold of the access slot.
    pub(super) async fn execute(&self, command: FanCommand) -> Result<CommandOutcome> {
        self.ensure_open()?;
        let access = self.access.lock().await;
        // Closing may have begun while queued for the slot
        self.ensure_open()?;

        let timeout = self.config.timeout();
        tracing::debug!(%command, "Sending command");

        if let Err(cause) = bounded(timeout, self.transport.send_command(command, timeout)).await {
            tracing::error!(%command, error = %cause, "Command failed");
            self.events.publish(CoordinatorEvent::CommandFailed {
                command,
                kind: cause.kind(),
            });
            return Err(Error::CommandFailed { cause });
        }

        self.events.publish(CoordinatorEvent::CommandSent { command });

        match self.confirm_locked(&access).await {
            Ok(state) => Ok(CommandOutcome::Confirmed(state)),
            Err(cause) => {
                tracing::warn!(
                    %command,
                    error = %cause,
                    "Command accepted but state confirmation failed"
                );
                self.events.publish(CoordinatorEvent::ConfirmationFailed {
                    command,
                    kind: cause.kind(),
                });
                Ok(CommandOutcome::Unconfirmed { cause })
            }
        }
    }

    /// Stops polling, drains outstanding work and releases the transport.
    pub(super) async fn close(&self) {
        let first = self.lifecycle.send_if_modified(|state| {
            if state.is_open() {
                *state = Lifecycle::Closing;
                true
            } else {
                false
            }
        });

        if !first {
            let mut lifecycle = self.lifecycle.subscribe();
            // Err only if the sender is gone, which cannot happen while &self lives
            let _ = lifecycle.wait_for(|s| *s == Lifecycle::Closed).await;
            return;
        }

        tracing::info!("Closing coordinator");

        let poller = self.poller.lock().take();
        if let Some(handle) = poller
            && let Err(e) = handle.await
        {
            tracing::warn!(error = %e, "Poll task ended abnormally");
        }

        let pending = self.in_flight.lock().clone();
        if let Some(mut rx) = pending {
            let _ = rx.wait_for(Option::is_some).await;
        }

        {
            let _access = self.access.lock().await;
            self.transport.close().await;
            self.observers.clear();
        }

        self.lifecycle.send_replace(Lifecycle::Closed);
        self.events.publish(CoordinatorEvent::Closed);
        tracing::info!("Coordinator closed");
    }
}

/// Applies the coordinator's own bound on top of the transport's.
async fn bounded<R>(
    timeout: Duration,
    call: impl Future<Output = std::result::Result<R, TransportError>>,
) -> std::result::Result<R, TransportError> {
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or_else(|_| Err(TransportError::timeout(timeout)))
}

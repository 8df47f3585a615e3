// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scheduled refresh loop.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::transport::DeviceTransport;

use super::Lifecycle;
use super::shared::Shared;

/// Refreshes once per `interval` until the coordinator leaves `Running`.
///
/// The first tick fires immediately. A refresh that is running when closing
/// begins completes before the loop exits. Errors are absorbed here: they
/// are already logged, counted and published by the refresh itself.
pub(super) async fn run<T: DeviceTransport>(
    shared: Weak<Shared<T>>,
    mut lifecycle: watch::Receiver<Lifecycle>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::debug!(interval_ms = interval.as_millis(), "Poll loop started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = lifecycle.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }

        if *lifecycle.borrow_and_update() != Lifecycle::Running {
            break;
        }

        let Some(shared) = shared.upgrade() else {
            break;
        };

        if let Err(e) = shared.refresh().await {
            tracing::trace!(error = %e, "Scheduled refresh failed");
        }
    }

    tracing::debug!("Poll loop stopped");
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinator event types.

use crate::command::FanCommand;
use crate::error::FailureKind;
use crate::state::StateChange;

/// Events emitted by the coordinator for diagnostics.
///
/// # Examples
///
/// ```
/// use blowcontrol::event::CoordinatorEvent;
/// use blowcontrol::error::FailureKind;
///
/// let event = CoordinatorEvent::Degraded {
///     kind: FailureKind::Timeout,
///     consecutive_failures: 2,
/// };
/// assert!(event.is_failure());
/// assert_eq!(event.failure_kind(), Some(FailureKind::Timeout));
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum CoordinatorEvent {
    /// A fetch succeeded and the snapshot was replaced.
    Refreshed {
        /// Fields that differ from the previous snapshot.
        changes: Vec<StateChange>,
    },

    /// A fetch failed; the snapshot was kept with `connected == false`.
    Degraded {
        /// Classification of the failure.
        kind: FailureKind,
        /// Number of failed refreshes since the last success.
        consecutive_failures: u32,
    },

    /// The device accepted a command.
    CommandSent {
        /// The command that was sent.
        command: FanCommand,
    },

    /// A command's transport call failed.
    CommandFailed {
        /// The command that failed.
        command: FanCommand,
        /// Classification of the failure.
        kind: FailureKind,
    },

    /// A command was accepted but its confirmation refresh failed.
    ConfirmationFailed {
        /// The command whose result could not be confirmed.
        command: FanCommand,
        /// Classification of the confirmation failure.
        kind: FailureKind,
    },

    /// The coordinator finished closing.
    Closed,
}

impl CoordinatorEvent {
    /// Returns `true` for events describing a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::Degraded { .. } | Self::CommandFailed { .. } | Self::ConfirmationFailed { .. }
        )
    }

    /// Returns the failure classification, if this is a failure event.
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Degraded { kind, .. }
            | Self::CommandFailed { kind, .. }
            | Self::ConfirmationFailed { kind, .. } => Some(*kind),
            Self::Refreshed { .. } | Self::CommandSent { .. } | Self::Closed => None,
        }
    }

    /// Returns the command this event relates to, if any.
    #[must_use]
    pub fn command(&self) -> Option<FanCommand> {
        match self {
            Self::CommandSent { command }
            | Self::CommandFailed { command, .. }
            | Self::ConfirmationFailed { command, .. } => Some(*command),
            Self::Refreshed { .. } | Self::Degraded { .. } | Self::Closed => None,
        }
    }
}

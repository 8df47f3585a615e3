// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Result of a command the device accepted.

use crate::error::{Error, TransportError};
use crate::state::DeviceState;

/// What happened after the device accepted a command.
///
/// A command call that returns `Ok` always means the device accepted the
/// write. Whether the coordinator could confirm the resulting state is
/// reported separately, because a failed confirmation is reconciled by the
/// next scheduled refresh rather than by the caller.
///
/// # Examples
///
/// ```
/// use blowcontrol::coordinator::CommandOutcome;
/// use blowcontrol::error::{Error, TransportError};
///
/// let outcome = CommandOutcome::Unconfirmed {
///     cause: TransportError::Timeout { after_ms: 10_000 },
/// };
/// assert!(!outcome.is_confirmed());
/// assert!(matches!(
///     outcome.confirmation_error(),
///     Some(Error::ConfirmationFailed { .. })
/// ));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum CommandOutcome {
    /// The confirmation refresh succeeded; this is the device's actual state.
    Confirmed(DeviceState),
    /// The confirmation refresh failed.
    Unconfirmed {
        /// Why the confirmation fetch failed.
        cause: TransportError,
    },
}

impl CommandOutcome {
    /// Returns `true` if the post-command state was confirmed.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }

    /// Returns the confirmed state, if any.
    #[must_use]
    pub fn state(&self) -> Option<&DeviceState> {
        match self {
            Self::Confirmed(state) => Some(state),
            Self::Unconfirmed { .. } => None,
        }
    }

    /// Returns the `ConfirmationFailed` classification for an unconfirmed
    /// outcome.
    #[must_use]
    pub fn confirmation_error(&self) -> Option<Error> {
        match self {
            Self::Confirmed(_) => None,
            Self::Unconfirmed { cause } => Some(Error::ConfirmationFailed {
                cause: cause.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmed_exposes_state() {
        let outcome = CommandOutcome::Confirmed(DeviceState::new().with_power(true));
        assert!(outcome.is_confirmed());
        assert!(outcome.state().is_some_and(DeviceState::power));
        assert!(outcome.confirmation_error().is_none());
    }

    #[test]
    fn unconfirmed_maps_to_confirmation_failed() {
        let cause = TransportError::communication("refused");
        let outcome = CommandOutcome::Unconfirmed {
            cause: cause.clone(),
        };
        assert!(outcome.state().is_none());
        assert_eq!(
            outcome.confirmation_error(),
            Some(Error::ConfirmationFailed { cause })
        );
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `blowcontrol` library.
//!
//! Failures are classified into a small taxonomy:
//!
//! - [`TransportError`]: what a [`DeviceTransport`](crate::transport::DeviceTransport)
//!   may report (timeout or communication failure)
//! - [`ValueError`]: a control value rejected before any I/O
//! - [`Error`]: the public error surfaced by the coordinator

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// The main error type for this library.
///
/// All variants are `Clone` so a single refresh outcome can be handed to
/// every caller waiting on the same in-flight fetch.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// A device round-trip failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A control value was rejected before touching the transport.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ValueError),

    /// The transport call carrying a command failed; local state is untouched.
    #[error("command failed: {cause}")]
    CommandFailed {
        /// The underlying transport failure.
        cause: TransportError,
    },

    /// The device accepted a command but the confirmation refresh failed.
    #[error("state confirmation failed: {cause}")]
    ConfirmationFailed {
        /// The failure of the confirmation fetch.
        cause: TransportError,
    },

    /// The coordinator is closing or closed.
    #[error("coordinator is closed")]
    Closed,
}

impl Error {
    /// Returns the transport failure classification, if any.
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Transport(cause)
            | Self::CommandFailed { cause }
            | Self::ConfirmationFailed { cause } => Some(cause.kind()),
            Self::InvalidArgument(_) | Self::Closed => None,
        }
    }
}

/// Failures reported by a device transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The call exceeded its time bound.
    #[error("request timed out after {after_ms} ms")]
    Timeout {
        /// The bound that was exceeded, in milliseconds.
        after_ms: u64,
    },

    /// The device was reachable but the exchange failed (refused, garbled, ...).
    #[error("communication error: {0}")]
    Communication(String),
}

impl TransportError {
    /// Creates a timeout error for the given bound.
    #[must_use]
    pub fn timeout(after: Duration) -> Self {
        Self::Timeout {
            after_ms: u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Creates a communication error from any displayable cause.
    #[must_use]
    pub fn communication(cause: impl fmt::Display) -> Self {
        Self::Communication(cause.to_string())
    }

    /// Returns the classification of this failure.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Communication(_) => FailureKind::CommunicationError,
        }
    }
}

/// Classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FailureKind {
    /// The call exceeded its time bound.
    Timeout,
    /// The device was reachable but the exchange failed.
    CommunicationError,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("timeout"),
            Self::CommunicationError => f.write_str("communication error"),
        }
    }
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// An unknown fan direction was provided.
    #[error("invalid direction: {0}")]
    InvalidDirection(String),

    /// An invalid power state string was provided.
    #[error("invalid power state: {0}")]
    InvalidPowerState(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinator lifecycle states.

use std::fmt;

/// Lifecycle of a [`Coordinator`](crate::Coordinator).
///
/// `Created → Running → Closing → Closed`. There is no transition out of
/// `Closed`. A coordinator may also go straight from `Created` to `Closing`
/// if it is closed without ever being started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Constructed; no poll timer yet.
    Created,
    /// Poll timer active.
    Running,
    /// Timer stopped; draining the in-flight call.
    Closing,
    /// Transport released.
    Closed,
}

impl Lifecycle {
    /// Returns `true` while new operations are accepted.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Created | Self::Running)
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Closing => "closing",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

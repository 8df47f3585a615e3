// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for fan control.
//!
//! Each type ensures values are within their valid ranges at construction
//! time, so invalid control values are rejected before any device I/O.
//!
//! # Types
//!
//! - [`Speed`] - Discrete speed level (0-4)
//! - [`Direction`] - Forward/reverse airflow
//! - [`PowerState`] - On/Off as reported on the wire

mod direction;
mod power;
mod speed;

pub use direction::Direction;
pub use power::PowerState;
pub use speed::Speed;

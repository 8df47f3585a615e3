// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan control commands.
//!
//! A [`FanCommand`] is the unit of work handed to
//! [`DeviceTransport::send_command`](crate::transport::DeviceTransport::send_command).
//! Values inside a command are already validated, so a command that exists
//! is always well-formed.
//!
//! # Available Commands
//!
//! | Command | Purpose | CLI form |
//! |---------|---------|----------|
//! | [`FanCommand::SetPower`] | Turn the fan on or off | `power on` |
//! | [`FanCommand::SetSpeed`] | Select a speed level (0-4) | `speed 3` |
//! | [`FanCommand::SetOscillating`] | Start/stop oscillation | `oscillation off` |
//! | [`FanCommand::SetDirection`] | Select airflow direction | `direction reverse` |
//!
//! # Examples
//!
//! ```
//! use blowcontrol::command::FanCommand;
//! use blowcontrol::types::Speed;
//!
//! let cmd = FanCommand::SetSpeed(Speed::HIGH);
//! assert_eq!(cmd.name(), "speed");
//! assert_eq!(cmd.cli_args(), vec!["speed".to_string(), "3".to_string()]);
//! ```

mod fan;

pub use fan::FanCommand;

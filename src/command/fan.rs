// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan command definitions.

use std::fmt;

use crate::types::{Direction, PowerState, Speed};

/// A control command for the fan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FanCommand {
    /// Turn the fan on (`true`) or off (`false`).
    SetPower(bool),
    /// Select a speed level.
    SetSpeed(Speed),
    /// Start (`true`) or stop (`false`) oscillation.
    SetOscillating(bool),
    /// Select the airflow direction.
    SetDirection(Direction),
}

impl FanCommand {
    /// Returns the command name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetPower(_) => "power",
            Self::SetSpeed(_) => "speed",
            Self::SetOscillating(_) => "oscillation",
            Self::SetDirection(_) => "direction",
        }
    }

    /// Returns the command payload.
    #[must_use]
    pub fn payload(&self) -> String {
        match self {
            Self::SetPower(on) | Self::SetOscillating(on) => {
                PowerState::from(*on).as_str().to_lowercase()
            }
            Self::SetSpeed(speed) => speed.value().to_string(),
            Self::SetDirection(direction) => direction.as_str().to_string(),
        }
    }

    /// Returns the argument list for the `blowcontrol` command-line tool.
    #[must_use]
    pub fn cli_args(&self) -> Vec<String> {
        vec![self.name().to_string(), self.payload()]
    }
}

impl fmt::Display for FanCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.payload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_command_format() {
        assert_eq!(FanCommand::SetPower(true).to_string(), "power on");
        assert_eq!(FanCommand::SetPower(false).to_string(), "power off");
    }

    #[test]
    fn speed_command_format() {
        let cmd = FanCommand::SetSpeed(Speed::MAX);
        assert_eq!(cmd.name(), "speed");
        assert_eq!(cmd.payload(), "4");
    }

    #[test]
    fn oscillation_command_format() {
        assert_eq!(
            FanCommand::SetOscillating(true).cli_args(),
            vec!["oscillation".to_string(), "on".to_string()]
        );
    }

    #[test]
    fn direction_command_format() {
        assert_eq!(
            FanCommand::SetDirection(Direction::Reverse).to_string(),
            "direction reverse"
        );
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Airflow direction.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Direction of the fan's airflow.
///
/// # Examples
///
/// ```
/// use blowcontrol::types::Direction;
///
/// let dir: Direction = "Reverse".parse().unwrap();
/// assert_eq!(dir, Direction::Reverse);
/// assert_eq!(dir.as_str(), "reverse");
/// assert!("sideways".parse::<Direction>().is_err());
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Direction {
    /// Normal airflow.
    #[default]
    Forward,
    /// Reversed airflow.
    Reverse,
}

impl Direction {
    /// Returns the wire string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Reverse => "reverse",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "forward" => Ok(Self::Forward),
            "reverse" => Ok(Self::Reverse),
            _ => Err(ValueError::InvalidDirection(s.to_string())),
        }
    }
}

impl TryFrom<String> for Direction {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Direction> for &'static str {
    fn from(value: Direction) -> Self {
        value.as_str()
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discrete fan speed levels.
//!
//! The fan exposes five levels. Level 0 is the off-equivalent speed and is
//! independent of the power flag.
//!
//! # Coordinator Methods
//!
//! Use [`Speed`] with [`Coordinator::set_speed()`](crate::Coordinator::set_speed).
//! Views translate it to and from a percentage with [`Speed::percentage()`]
//! and [`Speed::from_percentage()`].

use std::fmt;

use crate::error::ValueError;

/// Fan speed level (0-4).
///
/// # Examples
///
/// ```
/// use blowcontrol::types::Speed;
///
/// let speed = Speed::new(2).unwrap();
/// assert_eq!(speed, Speed::MEDIUM);
/// assert_eq!(speed.percentage(), 50);
/// assert_eq!(speed.name(), "Medium");
///
/// assert!(Speed::new(5).is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Speed(u8);

impl Speed {
    /// Minimum level.
    pub const MIN: u8 = 0;

    /// Maximum level.
    pub const MAX_LEVEL: u8 = 4;

    /// Off-equivalent speed.
    pub const OFF: Self = Self(0);

    /// Low speed.
    pub const LOW: Self = Self(1);

    /// Medium speed.
    pub const MEDIUM: Self = Self(2);

    /// High speed.
    pub const HIGH: Self = Self(3);

    /// Maximum speed.
    pub const MAX: Self = Self(4);

    /// Number of distinct levels, including off.
    pub const COUNT: usize = 5;

    /// Creates a new speed level.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if level is outside [0, 4].
    pub fn new(level: u8) -> Result<Self, ValueError> {
        if level > Self::MAX_LEVEL {
            return Err(ValueError::OutOfRange {
                min: u16::from(Self::MIN),
                max: u16::from(Self::MAX_LEVEL),
                actual: u16::from(level),
            });
        }
        Ok(Self(level))
    }

    /// Converts a 0-100 percentage to the nearest level at or above it.
    ///
    /// 0% is [`Speed::OFF`]; any non-zero percentage maps to at least
    /// [`Speed::LOW`].
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if percentage is above 100.
    pub fn from_percentage(percentage: u8) -> Result<Self, ValueError> {
        if percentage > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: u16::from(percentage),
            });
        }
        let scaled = u16::from(percentage) * u16::from(Self::MAX_LEVEL);
        let level = u8::try_from(scaled.div_ceil(100)).unwrap_or(Self::MAX_LEVEL);
        Ok(Self(level))
    }

    /// Returns the raw level.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the level as a percentage (0, 25, 50, 75, 100).
    #[must_use]
    pub const fn percentage(&self) -> u8 {
        self.0 * 25
    }

    /// Returns `true` for the off-equivalent level.
    #[must_use]
    pub const fn is_off(&self) -> bool {
        self.0 == 0
    }

    /// Returns the human-readable level name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self.0 {
            0 => "Off",
            1 => "Low",
            2 => "Medium",
            3 => "High",
            _ => "Max",
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Speed {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Speed> for u8 {
    fn from(value: Speed) -> Self {
        value.0
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration types.
//!
//! Configuration is supplied fully formed by the host; this crate does not
//! acquire or validate it beyond applying defaults.
//!
//! - [`DeviceConfig`]: how to reach the fan
//! - [`CoordinatorConfig`]: polling cadence and time bounds

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection parameters for a fan.
///
/// # Examples
///
/// ```
/// use blowcontrol::config::DeviceConfig;
///
/// let config = DeviceConfig::new("192.168.1.100")
///     .with_serial_number("ABC-123")
///     .with_mqtt_password("secret")
///     .with_name("Bedroom Fan");
///
/// assert_eq!(config.mqtt_port(), 1883);
/// assert_eq!(config.root_topic(), "438M");
/// // The password never shows up in debug output
/// assert!(!format!("{config:?}").contains("secret"));
/// ```
///
/// Deserializing fills in defaults for missing keys:
///
/// ```
/// use blowcontrol::config::DeviceConfig;
///
/// let config: DeviceConfig = serde_json::from_str(r#"{"device_ip": "10.0.0.7"}"#).unwrap();
/// assert_eq!(config.device_ip(), "10.0.0.7");
/// assert_eq!(config.name(), "BlowControl Fan");
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    device_ip: String,
    #[serde(default)]
    mqtt_password: String,
    #[serde(default)]
    serial_number: String,
    #[serde(default = "DeviceConfig::default_mqtt_port")]
    mqtt_port: u16,
    #[serde(default = "DeviceConfig::default_root_topic")]
    root_topic: String,
    #[serde(default = "DeviceConfig::default_name")]
    name: String,
}

impl DeviceConfig {
    /// Default MQTT port of the device.
    pub const DEFAULT_MQTT_PORT: u16 = 1883;
    /// Default MQTT root topic of the device.
    pub const DEFAULT_ROOT_TOPIC: &'static str = "438M";
    /// Default display name.
    pub const DEFAULT_NAME: &'static str = "BlowControl Fan";

    /// Creates a configuration for the device at the given address.
    #[must_use]
    pub fn new(device_ip: impl Into<String>) -> Self {
        Self {
            device_ip: device_ip.into(),
            mqtt_password: String::new(),
            serial_number: String::new(),
            mqtt_port: Self::DEFAULT_MQTT_PORT,
            root_topic: Self::DEFAULT_ROOT_TOPIC.to_string(),
            name: Self::DEFAULT_NAME.to_string(),
        }
    }

    fn default_mqtt_port() -> u16 {
        Self::DEFAULT_MQTT_PORT
    }

    fn default_root_topic() -> String {
        Self::DEFAULT_ROOT_TOPIC.to_string()
    }

    fn default_name() -> String {
        Self::DEFAULT_NAME.to_string()
    }

    /// Sets the MQTT password.
    #[must_use]
    pub fn with_mqtt_password(mut self, password: impl Into<String>) -> Self {
        self.mqtt_password = password.into();
        self
    }

    /// Sets the device serial number.
    #[must_use]
    pub fn with_serial_number(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = serial.into();
        self
    }

    /// Sets the MQTT port.
    #[must_use]
    pub fn with_mqtt_port(mut self, port: u16) -> Self {
        self.mqtt_port = port;
        self
    }

    /// Sets the MQTT root topic.
    #[must_use]
    pub fn with_root_topic(mut self, topic: impl Into<String>) -> Self {
        self.root_topic = topic.into();
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the device address.
    #[must_use]
    pub fn device_ip(&self) -> &str {
        &self.device_ip
    }

    /// Returns the MQTT password.
    #[must_use]
    pub fn mqtt_password(&self) -> &str {
        &self.mqtt_password
    }

    /// Returns the serial number.
    #[must_use]
    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    /// Returns the MQTT port.
    #[must_use]
    pub fn mqtt_port(&self) -> u16 {
        self.mqtt_port
    }

    /// Returns the MQTT root topic.
    #[must_use]
    pub fn root_topic(&self) -> &str {
        &self.root_topic
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the environment the device tool expects.
    #[must_use]
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        vec![
            ("DEVICE_IP", self.device_ip.clone()),
            ("MQTT_PASSWORD", self.mqtt_password.clone()),
            ("SERIAL_NUMBER", self.serial_number.clone()),
            ("MQTT_PORT", self.mqtt_port.to_string()),
            ("ROOT_TOPIC", self.root_topic.clone()),
        ]
    }
}

impl fmt::Debug for DeviceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceConfig")
            .field("device_ip", &self.device_ip)
            .field("mqtt_password", &"***")
            .field("serial_number", &self.serial_number)
            .field("mqtt_port", &self.mqtt_port)
            .field("root_topic", &self.root_topic)
            .field("name", &self.name)
            .finish()
    }
}

/// Polling cadence and time bounds for a [`Coordinator`](crate::Coordinator).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use blowcontrol::config::CoordinatorConfig;
///
/// let config = CoordinatorConfig::default()
///     .with_poll_interval(Duration::from_secs(10));
///
/// assert_eq!(config.timeout(), Duration::from_secs(10));
/// // Staleness follows the poll interval unless set explicitly
/// assert_eq!(config.staleness(), Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    poll_interval: Duration,
    timeout: Duration,
    staleness: Option<Duration>,
}

impl CoordinatorConfig {
    /// Default interval between scheduled refreshes.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
    /// Default bound on each transport call.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Multiple of the poll interval used when no staleness is set.
    pub const STALENESS_INTERVALS: u32 = 3;

    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the staleness threshold.
    #[must_use]
    pub fn with_staleness(mut self, staleness: Duration) -> Self {
        self.staleness = Some(staleness);
        self
    }

    /// Returns the poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the per-call timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the staleness threshold.
    #[must_use]
    pub fn staleness(&self) -> Duration {
        self.staleness
            .unwrap_or_else(|| self.poll_interval.saturating_mul(Self::STALENESS_INTERVALS))
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            timeout: Self::DEFAULT_TIMEOUT,
            staleness: None,
        }
    }
}

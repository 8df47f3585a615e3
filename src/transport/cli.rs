// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport backed by the `blowcontrol` command-line tool.
//!
//! The tool talks to the fan over its own protocol; this transport only
//! spawns it with the connection parameters in its environment and reads
//! its output.

use std::process::Output;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;

use crate::command::FanCommand;
use crate::config::DeviceConfig;
use crate::error::TransportError;
use crate::state::DeviceState;
use crate::types::{Direction, PowerState, Speed};

use super::DeviceTransport;

/// State document printed by `blowcontrol state --json`.
///
/// Every field is required: a missing reading is a communication failure,
/// never a default.
#[derive(Debug, Deserialize)]
struct CliState {
    power: PowerState,
    speed: Speed,
    oscillating: bool,
    direction: Direction,
    rpm: u32,
    temperature: f64,
    humidity: f64,
    air_quality: f64,
}

impl From<CliState> for DeviceState {
    fn from(raw: CliState) -> Self {
        DeviceState::new()
            .with_power(raw.power.is_on())
            .with_speed(raw.speed)
            .with_oscillating(raw.oscillating)
            .with_direction(raw.direction)
            .with_temperature_c(raw.temperature)
            .with_humidity_pct(raw.humidity)
            .with_pm25(raw.air_quality)
            .with_fan_rpm(raw.rpm)
    }
}

/// Transport that runs the `blowcontrol` tool once per call.
///
/// # Examples
///
/// ```no_run
/// use blowcontrol::config::DeviceConfig;
/// use blowcontrol::transport::CliTransport;
/// use blowcontrol::Coordinator;
///
/// # async fn example() {
/// let config = DeviceConfig::new("192.168.1.100")
///     .with_serial_number("ABC-123")
///     .with_mqtt_password("secret");
///
/// let coordinator = Coordinator::builder(CliTransport::new(config)).build();
/// coordinator.start();
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CliTransport {
    config: DeviceConfig,
    program: String,
}

impl CliTransport {
    /// Default program name, resolved through `PATH`.
    pub const DEFAULT_PROGRAM: &'static str = "blowcontrol";

    /// Creates a transport for the given device.
    #[must_use]
    pub fn new(config: DeviceConfig) -> Self {
        Self {
            config,
            program: Self::DEFAULT_PROGRAM.to_string(),
        }
    }

    /// Uses a different program path.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Returns the device configuration.
    #[must_use]
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Runs the tool with the given arguments, bounded by `timeout`.
    ///
    /// The child is killed if the bound is exceeded.
    async fn run(&self, args: &[String], timeout: Duration) -> Result<Output, TransportError> {
        tracing::debug!(program = %self.program, ?args, "Running device tool");

        let child = Command::new(&self.program)
            .args(args)
            .envs(self.config.env_vars())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(timeout, child)
            .await
            .map_err(|_| TransportError::timeout(timeout))?
            .map_err(|e| {
                TransportError::communication(format!("failed to run {}: {e}", self.program))
            })?;

        if output.status.success() {
            Ok(output)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(TransportError::communication(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )))
        }
    }
}

/// Decodes the JSON printed by `blowcontrol state --json`.
fn parse_state(stdout: &[u8]) -> Result<DeviceState, TransportError> {
    serde_json::from_slice::<CliState>(stdout)
        .map(DeviceState::from)
        .map_err(|e| TransportError::communication(format!("malformed state document: {e}")))
}

impl DeviceTransport for CliTransport {
    async fn fetch(&self, timeout: Duration) -> Result<DeviceState, TransportError> {
        let args = ["state".to_string(), "--json".to_string()];
        let output = self.run(&args, timeout).await?;
        parse_state(&output.stdout)
    }

    async fn send_command(
        &self,
        command: FanCommand,
        timeout: Duration,
    ) -> Result<(), TransportError> {
        self.run(&command.cli_args(), timeout).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATE_JSON: &str = r#"{
        "power": "ON",
        "speed": 2,
        "oscillating": false,
        "direction": "forward",
        "rpm": 1200,
        "temperature": 22.5,
        "humidity": 45.2,
        "air_quality": 12.3,
        "connected": true,
        "last_seen": "2024-01-01T12:00:00Z"
    }"#;

    #[test]
    fn parse_full_document() {
        let state = parse_state(STATE_JSON.as_bytes()).unwrap();
        assert!(state.power());
        assert_eq!(state.speed(), Speed::MEDIUM);
        assert!(!state.oscillating());
        assert_eq!(state.direction(), Direction::Forward);
        assert_eq!(state.fan_rpm(), 1200);
        assert!((state.temperature_c() - 22.5).abs() < f64::EPSILON);
        assert!((state.humidity_pct() - 45.2).abs() < f64::EPSILON);
        assert!((state.pm25() - 12.3).abs() < f64::EPSILON);
        // The coordinator decides connectivity, not the document
        assert!(!state.connected());
    }

    #[test]
    fn missing_field_is_communication_error() {
        let err = parse_state(br#"{"power": "OFF", "speed": 0}"#).unwrap_err();
        assert!(matches!(err, TransportError::Communication(_)));
    }

    #[test]
    fn out_of_range_speed_is_rejected() {
        let json = STATE_JSON.replace("\"speed\": 2", "\"speed\": 9");
        assert!(parse_state(json.as_bytes()).is_err());
    }

    #[test]
    fn garbage_is_communication_error() {
        let err = parse_state(b"not json").unwrap_err();
        assert!(err.to_string().contains("malformed state document"));
    }

    #[tokio::test]
    async fn missing_program_is_communication_error() {
        let transport = CliTransport::new(DeviceConfig::new("127.0.0.1"))
            .with_program("/nonexistent/blowcontrol-tool");

        let err = transport
            .fetch(Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Communication(_)));
    }
}

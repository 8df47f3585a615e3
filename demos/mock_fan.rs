// SPDX-License-Identifier: MPL-2.0

//! Demo program: drive the coordinator against a simulated fan.
//!
//! Shows a command being confirmed, a device that stops answering, and the
//! next poll reconciling state. Runs without any hardware.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --example mock_fan
//! ```

use std::sync::Arc;
use std::time::Duration;

use blowcontrol::transport::MockTransport;
use blowcontrol::views::{SensorKind, register_views};
use blowcontrol::{Coordinator, DeviceState, Direction, Observer, Speed};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let device = DeviceState::new()
        .with_speed(Speed::MEDIUM)
        .with_temperature_c(22.5)
        .with_humidity_pct(45.2)
        .with_pm25(12.3)
        .with_fan_rpm(1200);
    let transport = Arc::new(
        MockTransport::new()
            .with_device(device)
            .with_latency(Duration::from_millis(200)),
    );

    let coordinator = Coordinator::builder(Arc::clone(&transport))
        .with_poll_interval(Duration::from_secs(2))
        .with_timeout(Duration::from_secs(1))
        .build();
    let views = register_views(&coordinator, "Mock Fan", "mock");
    coordinator.start();

    tokio::time::sleep(Duration::from_millis(500)).await;
    println!("Initial: on={:?} percentage={:?}", views.fan.is_on(), views.fan.percentage());

    let outcome = views.fan.turn_on(None).await?;
    println!("turn_on confirmed: {}", outcome.is_confirmed());

    println!("Simulating an unresponsive device...");
    transport.push_fetch_hang();
    let outcome = views.fan.set_direction(Direction::Reverse).await?;
    if let Some(err) = outcome.confirmation_error() {
        println!("set_direction delivered, {err}");
    }
    println!("Fan available: {}", views.fan.is_available());

    tokio::time::sleep(Duration::from_secs(3)).await;
    println!(
        "After next poll: available={} direction={:?} temperature={:?}",
        views.fan.is_available(),
        views.fan.direction(),
        views.sensor(SensorKind::Temperature).and_then(|s| s.value())
    );

    coordinator.close().await;
    println!("Closed; fetches={} commands={}", transport.fetch_count(), transport.command_count());
    Ok(())
}

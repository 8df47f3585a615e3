// SPDX-License-Identifier: MPL-2.0

//! Demo program: poll a real fan through the `blowcontrol` tool and print
//! every state change.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example poll -- <device_ip> <serial_number> <mqtt_password> [seconds]
//! ```
//!
//! Set `RUST_LOG=blowcontrol=debug` to see the coordinator's own logs.

use std::env;
use std::time::Duration;

use blowcontrol::config::DeviceConfig;
use blowcontrol::transport::CliTransport;
use blowcontrol::views::{BinaryKind, SensorKind, ViewSet, register_views};
use blowcontrol::{Coordinator, CoordinatorEvent, DeviceTransport};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!(
            "Usage: {} <device_ip> <serial_number> <mqtt_password> [seconds]",
            args[0]
        );
        std::process::exit(1);
    }

    let seconds: u64 = args.get(4).map_or(Ok(120), |s| s.parse())?;
    let config = DeviceConfig::new(&args[1])
        .with_serial_number(&args[2])
        .with_mqtt_password(&args[3]);
    let name = config.name().to_string();

    let coordinator = Coordinator::builder(CliTransport::new(config))
        .with_poll_interval(Duration::from_secs(10))
        .build();
    let views = register_views(&coordinator, &name, "demo");
    let mut events = coordinator.events();

    coordinator.start();
    println!("Polling {name} for {seconds}s...");

    let deadline = tokio::time::sleep(Duration::from_secs(seconds));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            () = &mut deadline => break,
            event = events.recv() => match event {
                Ok(CoordinatorEvent::Refreshed { changes }) => {
                    for change in changes {
                        println!("  {change}");
                    }
                    print_views(&views);
                }
                Ok(CoordinatorEvent::Degraded { kind, consecutive_failures }) => {
                    println!("Device unreachable ({kind}), {consecutive_failures} in a row");
                }
                Ok(other) => println!("{other:?}"),
                Err(RecvError::Lagged(missed)) => println!("Missed {missed} events"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    println!("Closing...");
    coordinator.close().await;
    Ok(())
}

fn print_views<T: DeviceTransport>(views: &ViewSet<T>) {
    let fan = &views.fan;
    println!(
        "{}: on={:?} speed={:?}% oscillating={:?} direction={:?}",
        fan.info().name(),
        fan.is_on(),
        fan.percentage(),
        fan.oscillating(),
        fan.direction()
    );

    for kind in SensorKind::ALL {
        if let Some(sensor) = views.sensor(kind) {
            match sensor.value() {
                Some(value) => println!("  {}: {value} {}", sensor.info().name(), sensor.unit()),
                None => println!("  {}: unknown", sensor.info().name()),
            }
        }
    }

    if let Some(connected) = views.binary_sensor(BinaryKind::Connectivity) {
        println!("  {}: {}", connected.info().name(), connected.is_on());
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity views built on the [`Observer`] capability.
//!
//! Each view maps part of a [`DeviceState`](crate::state::DeviceState)
//! into its own terms and knows nothing about the others. They share one
//! [`Coordinator`] through [`register_views`].
//!
//! | View | Follows | Unique id suffix |
//! |------|---------|------------------|
//! | [`FanView`] | power, speed, oscillation, direction | `fan` |
//! | [`SensorView`] | one numeric reading | `temperature`, `humidity`, `air_quality`, `fan_speed` |
//! | [`BinarySensorView`] | `power` or `connected` | `power`, `connected` |

mod binary_sensor;
mod fan;
mod sensor;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::coordinator::Coordinator;
use crate::observer::Observer;
use crate::transport::DeviceTransport;

pub use binary_sensor::{BinaryKind, BinarySensorView};
pub use fan::FanView;
pub use sensor::{SensorKind, SensorView};

/// Display name and stable identifier of a view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityInfo {
    name: String,
    unique_id: String,
}

impl EntityInfo {
    /// Creates an identity from its parts.
    #[must_use]
    pub fn new(name: impl Into<String>, unique_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unique_id: unique_id.into(),
        }
    }

    /// Builds `"<device name> <label>"` / `"<entry id>_<key>"`.
    #[must_use]
    pub fn for_entity(device_name: &str, label: &str, entry_id: &str, key: &str) -> Self {
        Self::new(format!("{device_name} {label}"), format!("{entry_id}_{key}"))
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stable identifier.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }
}

impl fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.unique_id)
    }
}

/// Every view of one device, as registered by [`register_views`].
#[derive(Debug)]
pub struct ViewSet<T: DeviceTransport> {
    /// The controllable fan.
    pub fan: Arc<FanView<T>>,
    /// Numeric readings, in [`SensorKind::ALL`] order.
    pub sensors: Vec<Arc<SensorView>>,
    /// Power and connectivity, in [`BinaryKind::ALL`] order.
    pub binary_sensors: Vec<Arc<BinarySensorView>>,
}

impl<T: DeviceTransport> ViewSet<T> {
    /// Returns the sensor of the given kind.
    #[must_use]
    pub fn sensor(&self, kind: SensorKind) -> Option<&Arc<SensorView>> {
        self.sensors.iter().find(|s| s.kind() == kind)
    }

    /// Returns the binary sensor of the given kind.
    #[must_use]
    pub fn binary_sensor(&self, kind: BinaryKind) -> Option<&Arc<BinarySensorView>> {
        self.binary_sensors.iter().find(|s| s.kind() == kind)
    }

    /// Returns every view as an observer.
    #[must_use]
    pub fn observers(&self) -> Vec<Arc<dyn Observer>> {
        let mut all: Vec<Arc<dyn Observer>> =
            Vec::with_capacity(1 + self.sensors.len() + self.binary_sensors.len());
        all.push(self.fan.clone());
        all.extend(self.sensors.iter().map(|s| s.clone() as Arc<dyn Observer>));
        all.extend(
            self.binary_sensors
                .iter()
                .map(|s| s.clone() as Arc<dyn Observer>),
        );
        all
    }
}

/// Builds the full set of views for one device and subscribes them.
///
/// The fan view keeps a handle to the coordinator; closing the coordinator
/// unsubscribes every view, which releases that handle.
///
/// # Examples
///
/// ```
/// use blowcontrol::Coordinator;
/// use blowcontrol::transport::MockTransport;
/// use blowcontrol::views::{register_views, SensorKind};
///
/// let coordinator = Coordinator::builder(MockTransport::new()).build();
/// let views = register_views(&coordinator, "Bedroom Fan", "abc123");
///
/// assert_eq!(views.fan.info().unique_id(), "abc123_fan");
/// let humidity = views.sensor(SensorKind::Humidity).unwrap();
/// assert_eq!(humidity.info().name(), "Bedroom Fan Humidity");
/// assert_eq!(coordinator.observer_count(), 7);
/// ```
pub fn register_views<T: DeviceTransport>(
    coordinator: &Coordinator<T>,
    name: &str,
    entry_id: &str,
) -> ViewSet<T> {
    let fan = Arc::new(FanView::new(
        coordinator.clone(),
        EntityInfo::new(name, format!("{entry_id}_fan")),
    ));

    let sensors = SensorKind::ALL
        .iter()
        .map(|&kind| {
            let info = EntityInfo::for_entity(name, kind.label(), entry_id, kind.key());
            Arc::new(SensorView::new(kind, info))
        })
        .collect();

    let binary_sensors = BinaryKind::ALL
        .iter()
        .map(|&kind| {
            let info = EntityInfo::for_entity(name, kind.label(), entry_id, kind.key());
            Arc::new(BinarySensorView::new(kind, info))
        })
        .collect();

    let views = ViewSet {
        fan,
        sensors,
        binary_sensors,
    };

    for observer in views.observers() {
        coordinator.subscribe(observer);
    }
    tracing::debug!(entry_id, name, "Registered views");

    views
}

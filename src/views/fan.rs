// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controllable fan view.

use std::fmt;

use crate::coordinator::{CommandOutcome, Coordinator};
use crate::error::Result;
use crate::observer::{LastState, Observer};
use crate::state::DeviceState;
use crate::transport::DeviceTransport;
use crate::types::{Direction, Speed};

use super::EntityInfo;

/// The fan as a controllable entity.
///
/// Readings come only from snapshots the coordinator delivers. Control
/// calls go through the coordinator and the view changes when the
/// resulting refresh is delivered, never before.
pub struct FanView<T: DeviceTransport> {
    info: EntityInfo,
    coordinator: Coordinator<T>,
    last: LastState,
}

impl<T: DeviceTransport> FanView<T> {
    /// Creates a view controlling the fan through `coordinator`.
    ///
    /// The view is not subscribed; see [`register_views`](super::register_views).
    #[must_use]
    pub fn new(coordinator: Coordinator<T>, info: EntityInfo) -> Self {
        Self {
            info,
            coordinator,
            last: LastState::new(),
        }
    }

    /// Returns the entity identity.
    #[must_use]
    pub fn info(&self) -> &EntityInfo {
        &self.info
    }

    /// Whether the fan is on. `None` before the first reading.
    #[must_use]
    pub fn is_on(&self) -> Option<bool> {
        self.reading(DeviceState::power)
    }

    /// Current speed level.
    #[must_use]
    pub fn speed(&self) -> Option<Speed> {
        self.reading(DeviceState::speed)
    }

    /// Current speed as a percentage, in steps of 25.
    #[must_use]
    pub fn percentage(&self) -> Option<u8> {
        self.speed().map(|speed| speed.percentage())
    }

    /// Number of speed levels, including off.
    #[must_use]
    pub const fn speed_count(&self) -> usize {
        Speed::COUNT
    }

    /// Whether the head is oscillating.
    #[must_use]
    pub fn oscillating(&self) -> Option<bool> {
        self.reading(DeviceState::oscillating)
    }

    /// Current airflow direction.
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        self.reading(DeviceState::direction)
    }

    fn reading<R>(&self, f: impl FnOnce(&DeviceState) -> R) -> Option<R> {
        self.last.map(|state| (!state.is_unknown()).then(|| f(state)))?
    }

    /// Turns the fan on.
    ///
    /// With a percentage, that speed is set first. Without one the last
    /// reported non-zero speed is restored, falling back to
    /// [`Speed::LOW`]. A percentage of zero turns the fan off instead.
    ///
    /// # Errors
    ///
    /// Returns the first failing command's error; later commands are not
    /// sent.
    pub async fn turn_on(&self, percentage: Option<u8>) -> Result<CommandOutcome> {
        let speed = match percentage {
            Some(0) => return self.turn_off().await,
            Some(pct) => Speed::from_percentage(pct)?,
            None => self.speed().filter(|s| !s.is_off()).unwrap_or(Speed::LOW),
        };

        tracing::debug!(
            entity = %self.info.unique_id(),
            speed = speed.name(),
            "Turning fan on"
        );
        self.coordinator.set_speed(speed.value()).await?;
        self.coordinator.set_power(true).await
    }

    /// Turns the fan off and resets its speed to zero.
    ///
    /// # Errors
    ///
    /// Returns the first failing command's error.
    pub async fn turn_off(&self) -> Result<CommandOutcome> {
        self.coordinator.set_power(false).await?;
        self.coordinator.set_speed(Speed::OFF.value()).await
    }

    /// Sets the speed from a percentage. Zero turns the fan off.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument)
    /// above 100, or the command's error.
    pub async fn set_percentage(&self, percentage: u8) -> Result<CommandOutcome> {
        if percentage == 0 {
            return self.turn_off().await;
        }
        let speed = Speed::from_percentage(percentage)?;
        self.coordinator.set_speed(speed.value()).await
    }

    /// Enables or disables oscillation.
    ///
    /// # Errors
    ///
    /// Returns the command's error.
    pub async fn set_oscillating(&self, on: bool) -> Result<CommandOutcome> {
        self.coordinator.set_oscillating(on).await
    }

    /// Sets the airflow direction.
    ///
    /// # Errors
    ///
    /// Returns the command's error.
    pub async fn set_direction(&self, direction: Direction) -> Result<CommandOutcome> {
        self.coordinator.set_direction(direction).await
    }
}

impl<T: DeviceTransport> Observer for FanView<T> {
    fn on_state_changed(&self, state: &DeviceState) {
        self.last.store(state);
    }

    fn is_available(&self) -> bool {
        self.last.connected()
    }
}

impl<T: DeviceTransport> fmt::Debug for FanView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanView")
            .field("info", &self.info)
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::command::FanCommand;
    use crate::error::{Error, TransportError};
    use crate::transport::{MockReply, MockTransport};

    type Mock = Arc<MockTransport>;

    fn setup(device: DeviceState) -> (Coordinator<Mock>, Arc<FanView<Mock>>) {
        let transport = Arc::new(MockTransport::new().with_device(device));
        let coordinator = Coordinator::builder(transport).build();
        let view = Arc::new(FanView::new(
            coordinator.clone(),
            EntityInfo::new("Fan", "entry_fan"),
        ));
        coordinator.subscribe(view.clone());
        (coordinator, view)
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_until_first_reading() {
        let (coordinator, view) = setup(DeviceState::new().with_speed(Speed::HIGH));
        assert_eq!(view.is_on(), None);
        assert!(!view.is_available());

        coordinator.refresh().await.unwrap();
        assert_eq!(view.percentage(), Some(75));
        assert_eq!(view.is_on(), Some(false));
        assert!(view.is_available());
    }

    #[tokio::test(start_paused = true)]
    async fn turn_on_restores_last_speed() {
        let (coordinator, view) = setup(DeviceState::new().with_speed(Speed::HIGH));
        coordinator.refresh().await.unwrap();

        view.turn_on(None).await.unwrap();

        assert_eq!(
            coordinator.transport().commands(),
            vec![FanCommand::SetSpeed(Speed::HIGH), FanCommand::SetPower(true)]
        );
        assert_eq!(view.is_on(), Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn turn_on_without_speed_uses_low() {
        let (_coordinator, view) = setup(DeviceState::new());
        view.turn_on(None).await.unwrap();
        assert_eq!(view.speed(), Some(Speed::LOW));
        assert_eq!(view.is_on(), Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_percentage_turns_off() {
        let (coordinator, view) =
            setup(DeviceState::new().with_power(true).with_speed(Speed::MAX));
        view.set_percentage(0).await.unwrap();

        let device = coordinator.transport().device().unwrap();
        assert!(!device.power());
        assert_eq!(device.speed(), Speed::OFF);
        assert_eq!(view.percentage(), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn percentage_above_hundred_is_rejected() {
        let (coordinator, view) = setup(DeviceState::new());
        let err = view.set_percentage(101).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(coordinator.transport().command_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_command_leaves_view_unchanged() {
        let (coordinator, view) = setup(DeviceState::new().with_power(true));
        coordinator.refresh().await.unwrap();

        coordinator
            .transport()
            .push_command(MockReply::Err(TransportError::communication("refused")));
        assert!(view.set_oscillating(true).await.is_err());

        assert_eq!(view.oscillating(), Some(false));
        assert!(view.is_available());
    }

    #[tokio::test(start_paused = true)]
    async fn goes_unavailable_when_refresh_fails() {
        let (coordinator, view) = setup(DeviceState::new().with_speed(Speed::LOW));
        coordinator.refresh().await.unwrap();

        coordinator
            .transport()
            .push_fetch(Err(TransportError::communication("refused")));
        let _ = coordinator.refresh().await;

        assert!(!view.is_available());
        // Last known readings stay visible
        assert_eq!(view.speed(), Some(Speed::LOW));
    }
}

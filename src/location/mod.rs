//! Location source
//!
//! Publishes the currently selected location to any number of subscribers.
//! The location comes from one of two places:
//! - the device, through a [`LocationProvider`]
//! - a mock location: an entry of the fixed mock list, a user-selected
//!   coordinate, or a dropped pin
//!
//! Subscribers always see the latest value and are only woken when it changes.

pub mod ip;
pub mod mock;

use crate::constants::labels::{CURRENT_LOCATION, DROPPED_PIN, USER_SELECTED};
use crate::coord::{Coordinates, LabeledLocation};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub use ip::IpLocator;
pub use mock::MockLocations;

/// Trait for device location backends
pub trait LocationProvider: Send + Sync + 'static {
    /// One-shot location fix
    ///
    /// Fails with `Error::PermissionDenied` when access was not granted and
    /// `Error::LocationUnavailable` when no fix could be obtained.
    fn current_location(&self) -> impl Future<Output = Result<Coordinates>> + Send;
}

/// The published location together with where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentLocation {
    pub location: LabeledLocation,
    pub is_mock: bool,
}

/// Which source drives the published location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveSource {
    Mock,
    Device,
}

#[derive(Debug)]
struct SourceState {
    active: ActiveSource,
    mocks: MockLocations,
    /// Bumped on every source switch; a device fetch only publishes if the
    /// generation it started under is still current.
    generation: u64,
}

pub struct LocationSource<P> {
    provider: Arc<P>,
    state: Mutex<SourceState>,
    tx: watch::Sender<Option<CurrentLocation>>,
}

impl<P: LocationProvider> LocationSource<P> {
    /// Source starting on the first mock location
    pub fn new(provider: P) -> Self {
        let source = Self::unstarted(provider, ActiveSource::Mock);
        source.publish(source.state().mocks.current(), true);
        source
    }

    /// Source starting on the device
    ///
    /// Nothing is published until [`use_system_location`](Self::use_system_location)
    /// or [`apply_device_fix`](Self::apply_device_fix) delivers a fix.
    pub fn on_device(provider: P) -> Self {
        Self::unstarted(provider, ActiveSource::Device)
    }

    fn unstarted(provider: P, active: ActiveSource) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            provider: Arc::new(provider),
            state: Mutex::new(SourceState {
                active,
                mocks: MockLocations::new(),
                generation: 0,
            }),
            tx,
        }
    }

    fn state(&self) -> MutexGuard<'_, SourceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, location: LabeledLocation, is_mock: bool) -> bool {
        let next = CurrentLocation { location, is_mock };
        self.tx.send_if_modified(|current| {
            if current.as_ref() == Some(&next) {
                false
            } else {
                debug!(label = %next.location.label, coords = %next.location.coords, "Location changed");
                *current = Some(next);
                true
            }
        })
    }

    /// Receiver replaying the latest location
    pub fn subscribe(&self) -> watch::Receiver<Option<CurrentLocation>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Option<CurrentLocation> {
        self.tx.borrow().clone()
    }

    pub fn active(&self) -> ActiveSource {
        self.state().active
    }

    /// Switch to a mock location picked by the user
    pub fn set_mock_location(&self, coords: Coordinates) -> Result<()> {
        self.set_mock(coords, USER_SELECTED)
    }

    /// Switch to a pin dropped on the map
    pub fn drop_pin(&self, coords: Coordinates) -> Result<()> {
        self.set_mock(coords, DROPPED_PIN)
    }

    fn set_mock(&self, coords: Coordinates, label: &str) -> Result<()> {
        coords.validate()?;
        {
            let mut state = self.state();
            state.active = ActiveSource::Mock;
            state.generation += 1;
        }
        self.publish(LabeledLocation::new(coords, label), true);
        Ok(())
    }

    /// Advance the mock list
    ///
    /// When the device is active this only switches back to the mock list at
    /// its current entry.
    pub fn next_mock_location(&self) -> LabeledLocation {
        let location = {
            let mut state = self.state();
            state.generation += 1;
            match state.active {
                ActiveSource::Mock => state.mocks.advance(),
                ActiveSource::Device => {
                    state.active = ActiveSource::Mock;
                    state.mocks.current()
                }
            }
        };
        info!(label = %location.label, "Using mock location");
        self.publish(location.clone(), true);
        location
    }

    /// Switch to the device and fetch a fix
    ///
    /// Subscribers keep seeing the previous location until the fetch
    /// resolves. On failure the previous location stays and the error is
    /// returned. A fix that arrives after the user switched away is dropped.
    pub async fn use_system_location(&self) -> Result<Coordinates> {
        let generation = {
            let mut state = self.state();
            state.active = ActiveSource::Device;
            state.generation += 1;
            state.generation
        };

        let provider = Arc::clone(&self.provider);
        let coords = match provider.current_location().await {
            Ok(coords) => coords,
            Err(e) => {
                warn!("Device location unavailable: {}", e);
                return Err(e);
            }
        };

        let still_current = {
            let state = self.state();
            state.generation == generation && state.active == ActiveSource::Device
        };
        if still_current {
            self.publish(LabeledLocation::new(coords, CURRENT_LOCATION), false);
        } else {
            debug!("Discarding device fix after source switch");
        }
        Ok(coords)
    }

    /// Feed a continuous device update
    ///
    /// Ignored unless the device is the active source. Returns whether the
    /// published location changed.
    pub fn apply_device_fix(&self, coords: Coordinates) -> bool {
        if self.active() != ActiveSource::Device || coords.validate().is_err() {
            return false;
        }
        self.publish(LabeledLocation::new(coords, CURRENT_LOCATION), false)
    }

    /// Keep following the device, polling it every `every`
    ///
    /// Polls only while the device is the active source and feeds each fix
    /// through [`apply_device_fix`](Self::apply_device_fix). A failed poll
    /// keeps the last fix. Runs until the returned task is aborted.
    pub fn follow_device(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let source = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if source.active() != ActiveSource::Device {
                    continue;
                }
                match source.provider.current_location().await {
                    Ok(coords) => {
                        source.apply_device_fix(coords);
                    }
                    Err(e) => debug!("Device poll failed: {}", e),
                }
            }
        })
    }
}

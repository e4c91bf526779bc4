//! Geocoding stage
//!
//! Turns a location into a raw address plus nearby objects. Owns the
//! "last geocoded" memo: a location within the coalescing distance of the
//! memo is not geocoded again. Every collaborator error is folded into a
//! [`GeocodeOutcome`]; nothing past this stage sees an `Error`.

use crate::config::GeocoderConfig;
use crate::coord::{haversine_distance, Coordinates};
use crate::error::Error;
use crate::geo::component::RawAddress;
use crate::geo::nearby::NearbyObject;
use crate::geo::response::{ReverseGeocodingResponse, STATUS_OK, STATUS_ZERO_RESULTS};
use crate::geo::ReverseGeocoder;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tunables for the geocoding stage
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeSettings {
    pub include_descriptors: bool,
    pub coalesce_meters: f64,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for GeocodeSettings {
    fn default() -> Self {
        Self::from(&GeocoderConfig::default())
    }
}

impl From<&GeocoderConfig> for GeocodeSettings {
    fn from(config: &GeocoderConfig) -> Self {
        Self {
            include_descriptors: config.include_descriptors,
            coalesce_meters: config.coalesce_meters,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// Why a geocode produced no address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Network error, non-success HTTP status or a non-OK API status
    Service,
    /// The payload could not be understood
    MalformedResponse,
}

/// Result of geocoding one location
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    Resolved {
        coords: Coordinates,
        formatted_address: String,
        address: RawAddress,
        nearby: Vec<NearbyObject>,
    },
    /// The service answered but has no address for this point
    NoResult { coords: Coordinates },
    Failed {
        coords: Coordinates,
        kind: FailureKind,
        message: String,
    },
}

impl GeocodeOutcome {
    pub fn coords(&self) -> Coordinates {
        match self {
            Self::Resolved { coords, .. }
            | Self::NoResult { coords }
            | Self::Failed { coords, .. } => *coords,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    /// Message to show when no address was produced
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Resolved { .. } => None,
            Self::NoResult { coords } => Some(format!("No address found near {}", coords)),
            Self::Failed { message, .. } => Some(message.clone()),
        }
    }

    /// Classify a geocoder response
    pub fn from_response(coords: Coordinates, response: ReverseGeocodingResponse) -> Self {
        match response.status.as_str() {
            STATUS_OK => match response.first_result() {
                Some(result) => Self::Resolved {
                    coords,
                    formatted_address: result.formatted_address.clone(),
                    address: result.raw_address(),
                    nearby: response.nearby_objects(),
                },
                None => Self::NoResult { coords },
            },
            STATUS_ZERO_RESULTS => Self::NoResult { coords },
            "" => Self::Failed {
                coords,
                kind: FailureKind::MalformedResponse,
                message: "Geocoding response has no status".to_string(),
            },
            status => Self::Failed {
                coords,
                kind: FailureKind::Service,
                message: match response.error_message {
                    Some(detail) if !detail.is_empty() => format!("{}: {}", status, detail),
                    _ => format!("Geocoding service returned {}", status),
                },
            },
        }
    }

    fn from_error(coords: Coordinates, error: Error) -> Self {
        let kind = match error {
            Error::MalformedResponse(_) | Error::Json(_) => FailureKind::MalformedResponse,
            _ => FailureKind::Service,
        };
        Self::Failed {
            coords,
            kind,
            message: error.to_string(),
        }
    }
}

/// Reverse geocoding with coalescing and retries
pub struct GeocodingStage<G> {
    geocoder: Arc<G>,
    settings: GeocodeSettings,
    last_geocoded: Option<Coordinates>,
}

impl<G: ReverseGeocoder> GeocodingStage<G> {
    pub fn new(geocoder: Arc<G>, settings: GeocodeSettings) -> Self {
        Self {
            geocoder,
            settings,
            last_geocoded: None,
        }
    }

    pub fn settings(&self) -> &GeocodeSettings {
        &self.settings
    }

    pub fn last_geocoded(&self) -> Option<Coordinates> {
        self.last_geocoded
    }

    /// Record `coords` as the next location to geocode
    ///
    /// Returns false, leaving the memo alone, when `coords` is within the
    /// coalescing distance of the last geocoded location.
    pub fn claim(&mut self, coords: Coordinates) -> bool {
        if let Some(last) = self.last_geocoded {
            let moved = haversine_distance(last, coords);
            if moved <= self.settings.coalesce_meters {
                debug!(moved_m = moved, "Location within coalescing distance, not geocoding");
                return false;
            }
        }
        self.last_geocoded = Some(coords);
        true
    }

    /// Forget a failed location so the same input can be geocoded again
    ///
    /// Does nothing when a newer location has been claimed since.
    pub fn release(&mut self, coords: Coordinates) {
        if self.last_geocoded == Some(coords) {
            self.last_geocoded = None;
        }
    }

    /// Forget the memo entirely
    pub fn forget(&mut self) {
        self.last_geocoded = None;
    }

    /// Geocode `coords`, retrying failed attempts
    ///
    /// The returned future owns everything it needs, so it can be spawned
    /// and aborted independently of the stage.
    pub fn request(&self, coords: Coordinates) -> impl Future<Output = GeocodeOutcome> + Send + 'static {
        let geocoder = Arc::clone(&self.geocoder);
        let settings = self.settings.clone();
        async move { geocode_with_retries(geocoder.as_ref(), coords, &settings).await }
    }

    /// Claim and geocode in one step; None when the location was coalesced
    pub async fn resolve(&mut self, coords: Coordinates) -> Option<GeocodeOutcome> {
        if !self.claim(coords) {
            return None;
        }
        let outcome = self.request(coords).await;
        if !outcome.is_resolved() {
            self.release(coords);
        }
        Some(outcome)
    }
}

async fn geocode_with_retries<G: ReverseGeocoder>(
    geocoder: &G,
    coords: Coordinates,
    settings: &GeocodeSettings,
) -> GeocodeOutcome {
    let attempts = settings.max_retries + 1;
    let mut attempt = 1;
    loop {
        debug!(%coords, attempt, "Reverse geocoding");
        let outcome = match geocoder
            .reverse_geocode(coords, settings.include_descriptors)
            .await
        {
            Ok(response) => GeocodeOutcome::from_response(coords, response),
            Err(e) => GeocodeOutcome::from_error(coords, e),
        };

        if outcome.is_resolved() {
            info!(%coords, "Location geocoded");
            return outcome;
        }
        if attempt >= attempts {
            warn!(%coords, attempts, "Geocoding gave up: {}", outcome.error_message().unwrap_or_default());
            return outcome;
        }

        debug!(%coords, attempt, "Geocode attempt failed, retrying");
        attempt += 1;
        tokio::time::sleep(settings.retry_delay).await;
    }
}

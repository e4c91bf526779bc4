//! One-shot resolution
//!
//! Runs a single location through geocoding and normalization without the
//! reactive driver. Used by the `resolve` command.

use crate::address::{AddressFormats, DisplayAddress};
use crate::coord::LabeledLocation;
use crate::error::{Error, Result};
use crate::geo::nearby::NearbyObject;
use crate::geo::ReverseGeocoder;
use crate::pipeline::geocode::{GeocodeOutcome, GeocodingStage};
use serde::{Deserialize, Serialize};

/// A location with its resolved address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub location: LabeledLocation,
    /// Address line as formatted by the geocoding service
    pub geocoder_address: String,
    pub address: DisplayAddress,
    pub nearby: Vec<NearbyObject>,
}

/// Geocode and normalize one location
pub async fn resolve_location<G: ReverseGeocoder>(
    stage: &GeocodingStage<G>,
    formats: &AddressFormats,
    location: LabeledLocation,
) -> Result<Resolution> {
    location.coords.validate()?;

    match stage.request(location.coords).await {
        GeocodeOutcome::Resolved {
            formatted_address,
            address,
            nearby,
            ..
        } => Ok(Resolution {
            address: formats.normalize(&address),
            geocoder_address: formatted_address,
            nearby,
            location,
        }),
        failed => Err(Error::Geocoding(failed.error_message().unwrap_or_default())),
    }
}

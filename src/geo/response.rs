//! Reverse geocoding response payload
//!
//! Mirrors the JSON returned by the Google Geocoding API. Every field has a
//! serde default so that a partial payload still parses; missing data shows up
//! as empty values instead of a hard failure.

use crate::coord::Coordinates;
use crate::geo::component::{AddressComponent, RawAddress};
use crate::geo::nearby::{Area, Landmark, NearbyObject};
use serde::{Deserialize, Serialize};

/// Status returned when the request succeeded with at least one result
pub const STATUS_OK: &str = "OK";

/// Status returned when the coordinate has no address
pub const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

/// Top-level reverse geocoding response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReverseGeocodingResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_descriptor: Option<AddressDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plus_code: Option<PlusCode>,
    #[serde(default)]
    pub results: Vec<AddressResult>,
}

impl ReverseGeocodingResponse {
    /// The best (first) address result
    pub fn first_result(&self) -> Option<&AddressResult> {
        self.results.first()
    }

    /// Landmarks followed by areas, in response order
    pub fn nearby_objects(&self) -> Vec<NearbyObject> {
        self.address_descriptor
            .as_ref()
            .map(AddressDescriptor::nearby_objects)
            .unwrap_or_default()
    }
}

/// Landmarks and areas around the geocoded point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressDescriptor {
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
    #[serde(default)]
    pub areas: Vec<Area>,
}

impl AddressDescriptor {
    pub fn nearby_objects(&self) -> Vec<NearbyObject> {
        self.landmarks
            .iter()
            .cloned()
            .map(NearbyObject::Landmark)
            .chain(self.areas.iter().cloned().map(NearbyObject::Area))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlusCode {
    #[serde(default)]
    pub compound_code: String,
    #[serde(default)]
    pub global_code: String,
}

/// A single address result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressResult {
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    #[serde(default)]
    pub formatted_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub place_id: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressResult {
    pub fn raw_address(&self) -> RawAddress {
        RawAddress::from_components(&self.address_components)
    }

    pub fn location(&self) -> Option<Coordinates> {
        self.geometry
            .as_ref()
            .map(|g| Coordinates::new(g.location.lat, g.location.lng))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
    #[serde(default)]
    pub location_type: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

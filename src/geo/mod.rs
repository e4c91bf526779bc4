//! Geocoding module
//!
//! Provides reverse geocoding (coordinates to address + nearby descriptors),
//! place details lookups and the data types both return.

pub mod component;
pub mod country;
pub mod google;
pub mod nearby;
pub mod places;
pub mod response;

use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::Result;

pub use component::{AddressComponent, AddressComponentType, RawAddress};
pub use nearby::{NearbyObject, SpatialRelationship};
pub use places::PlaceDetails;
pub use response::ReverseGeocodingResponse;

/// Trait for reverse geocoding backends
pub trait ReverseGeocoder: Send + Sync + 'static {
    /// Reverse geocode a coordinate
    ///
    /// When `include_descriptors` is set the response also carries nearby
    /// landmarks and areas.
    fn reverse_geocode(
        &self,
        coords: Coordinates,
        include_descriptors: bool,
    ) -> impl std::future::Future<Output = Result<ReverseGeocodingResponse>> + Send;
}

/// Trait for place details backends
pub trait PlaceLookup: Send + Sync + 'static {
    /// Resolve a place id to its address components and location
    fn place_details(
        &self,
        place_id: &str,
    ) -> impl std::future::Future<Output = Result<PlaceDetails>> + Send;
}

/// Get the default reverse geocoder
pub fn get_geocoder(config: &Config) -> Result<google::GoogleGeocoder> {
    google::GoogleGeocoder::from_config(config)
}

/// Get the default place details client
pub fn get_place_lookup(config: &Config) -> Result<places::GooglePlaces> {
    places::GooglePlaces::from_config(config)
}

//! Centralized constants for the landmark-address crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in meters (WGS84 approximation)
    pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

    /// Movement below this distance does not trigger a new reverse geocode
    pub const COALESCE_DISTANCE_METERS: f64 = 50.0;
}

/// External API endpoints
pub mod api {
    /// Google reverse geocoding endpoint
    pub const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

    /// Google Places API (New)
    pub const PLACES_URL: &str = "https://places.googleapis.com/v1";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";

    /// Environment variable that overrides the configured Maps API key
    pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";
}

/// Location labels shown next to the current location
pub mod labels {
    pub const CURRENT_LOCATION: &str = "Current Location";
    pub const USER_SELECTED: &str = "User selected";
    pub const DROPPED_PIN: &str = "Dropped Pin";
}

/// Cache settings
pub mod cache {
    /// IP location cache duration in seconds (1 hour)
    pub const IP_LOCATION_TTL_SECS: u64 = 3600;

    /// IP location cache file name
    pub const IP_LOCATION_CACHE_FILE: &str = "ip_location_cache.json";
}

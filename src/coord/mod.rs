//! Coordinates and labeled locations
//!
//! This module handles:
//! - Latitude/longitude values and their validation
//! - Human-readable labels attached to a selected location
//! - Great-circle distance between two coordinates

pub mod distance;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use distance::{haversine_distance, is_within};

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }

    /// Format as the `lat,lng` pair used in query strings
    pub fn to_query_value(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// A coordinate with the label it was selected under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledLocation {
    pub coords: Coordinates,
    pub label: String,
}

impl LabeledLocation {
    pub fn new(coords: Coordinates, label: impl Into<String>) -> Self {
        Self {
            coords,
            label: label.into(),
        }
    }
}

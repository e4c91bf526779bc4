//! Google Geocoding API backend
//!
//! Reverse geocodes a coordinate and optionally asks for the address
//! descriptor (nearby landmarks and areas).

use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::response::ReverseGeocodingResponse;
use crate::geo::ReverseGeocoder;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("landmark-address/", env!("CARGO_PKG_VERSION"));

/// Google reverse geocoding backend
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GoogleGeocoder {
    /// Create a new backend against `base_url`
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Create a backend from configuration; requires an API key
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            Error::Config(
                "No Maps API key configured (set geocoder.api_key or GOOGLE_MAPS_API_KEY)"
                    .to_string(),
            )
        })?;

        Self::new(
            config.geocoder.base_url.clone(),
            api_key,
            Duration::from_secs(config.geocoder.timeout_secs),
        )
    }

    /// Build the request URL for a coordinate
    fn request_url(&self, coords: Coordinates, include_descriptors: bool) -> String {
        let mut url = format!(
            "{}?latlng={}&key={}",
            self.base_url,
            urlencoding::encode(&coords.to_query_value()),
            urlencoding::encode(&self.api_key)
        );
        if include_descriptors {
            url.push_str("&enable_address_descriptor=true");
        }
        url
    }
}

impl ReverseGeocoder for GoogleGeocoder {
    async fn reverse_geocode(
        &self,
        coords: Coordinates,
        include_descriptors: bool,
    ) -> Result<ReverseGeocodingResponse> {
        let url = self.request_url(coords, include_descriptors);
        debug!(%coords, include_descriptors, "Requesting reverse geocode");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Geocoding(format!("Geocoding request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geocoding(format!(
                "Geocoding API returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Geocoding(format!("Failed to read geocoding response: {}", e)))?;

        serde_json::from_str(&body).map_err(|e| {
            Error::MalformedResponse(format!("Failed to parse geocoding response: {}", e))
        })
    }
}

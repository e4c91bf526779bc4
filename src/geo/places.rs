//! Place details lookups (Google Places API, New)
//!
//! Resolves a place id, as returned for autocomplete predictions or nearby
//! landmarks, to its address components and location. Results are cached per
//! place id for the lifetime of the client.

use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::component::{AddressComponent, RawAddress};
use crate::geo::nearby::NearbyObject;
use crate::geo::PlaceLookup;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use tracing::{debug, warn};

const FIELD_MASK: &str = "id,formattedAddress,addressComponents,location";

/// Place details as used by the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub place_id: String,
    pub formatted_address: String,
    pub location: Option<Coordinates>,
    pub components: Vec<AddressComponent>,
}

impl PlaceDetails {
    pub fn raw_address(&self) -> RawAddress {
        RawAddress::from_components(&self.components)
    }
}

/// Places API (New) response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaceResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    formatted_address: String,
    #[serde(default)]
    address_components: Vec<PlaceComponent>,
    location: Option<PlaceLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaceComponent {
    #[serde(default)]
    long_text: String,
    #[serde(default)]
    short_text: String,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceLocation {
    latitude: f64,
    longitude: f64,
}

impl PlaceResponse {
    fn into_details(self, requested_id: &str) -> PlaceDetails {
        PlaceDetails {
            place_id: if self.id.is_empty() {
                requested_id.to_string()
            } else {
                self.id
            },
            formatted_address: self.formatted_address,
            location: self
                .location
                .map(|l| Coordinates::new(l.latitude, l.longitude)),
            components: self
                .address_components
                .into_iter()
                .map(|c| AddressComponent {
                    long_name: c.long_text,
                    short_name: c.short_text,
                    types: c.types,
                })
                .collect(),
        }
    }
}

/// Google Places client with a per-id cache
#[derive(Debug, Clone)]
pub struct GooglePlaces {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    cache: Arc<RwLock<HashMap<String, PlaceDetails>>>,
}

impl GooglePlaces {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            Error::Config("No Maps API key configured for place lookups".to_string())
        })?;
        Self::new(
            config.places.base_url.clone(),
            api_key,
            Duration::from_secs(config.geocoder.timeout_secs),
        )
    }

    /// Number of cached places
    pub async fn cached(&self) -> usize {
        self.cache.read().await.len()
    }

    async fn fetch(&self, place_id: &str) -> Result<PlaceDetails> {
        let url = format!(
            "{}/places/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(place_id)
        );

        let response = self
            .client
            .get(&url)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", FIELD_MASK)
            .send()
            .await
            .map_err(|e| Error::PlaceLookup(format!("Place request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::PlaceLookup(format!(
                "Places API returned status {} for {}",
                response.status(),
                place_id
            )));
        }

        let body: PlaceResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("Failed to parse place details: {}", e)))?;

        Ok(body.into_details(place_id))
    }
}

impl PlaceLookup for GooglePlaces {
    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails> {
        if let Some(details) = self.cache.read().await.get(place_id) {
            debug!(place_id, "Place details cache hit");
            return Ok(details.clone());
        }

        let details = self.fetch(place_id).await?;
        self.cache
            .write()
            .await
            .insert(place_id.to_string(), details.clone());
        Ok(details)
    }
}

/// Resolve the location of every nearby object concurrently
///
/// Objects whose lookup fails or that have no location are dropped; the
/// remaining pairs keep the input order.
pub async fn resolve_nearby_locations<L: PlaceLookup>(
    lookup: Arc<L>,
    nearby: &[NearbyObject],
) -> Vec<(NearbyObject, Coordinates)> {
    let mut tasks = JoinSet::new();
    for (index, object) in nearby.iter().enumerate() {
        let lookup = Arc::clone(&lookup);
        let place_id = object.place_id().to_string();
        tasks.spawn(async move { (index, lookup.place_details(&place_id).await) });
    }

    let mut located = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(details))) => {
                if let Some(coords) = details.location {
                    located.push((index, coords));
                }
            }
            Ok((index, Err(e))) => {
                warn!(place_id = nearby[index].place_id(), "Failed to locate nearby object: {}", e);
            }
            Err(e) => warn!("Place lookup task failed: {}", e),
        }
    }

    located.sort_by_key(|(index, _)| *index);
    located
        .into_iter()
        .map(|(index, coords)| (nearby[index].clone(), coords))
        .collect()
}

//! IP-based device location
//!
//! Desktop stand-in for a device location provider. Looks the machine up on
//! ip-api.com and caches the fix on disk for an hour.

use crate::config::defaults::APP_DIR_NAME;
use crate::constants::api::IP_API_URL;
use crate::constants::cache::{IP_LOCATION_CACHE_FILE, IP_LOCATION_TTL_SECS};
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::location::LocationProvider;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

/// IP location provider with caching
#[derive(Debug)]
pub struct IpLocator {
    client: reqwest::Client,
    url: String,
    cache_path: Option<PathBuf>,
}

/// ip-api.com response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedFix {
    coords: Coordinates,
    city: Option<String>,
    timestamp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl IpLocator {
    /// Locator caching under the user cache directory
    pub fn new() -> Self {
        let cache_path = dirs::cache_dir()
            .map(|p| p.join(APP_DIR_NAME).join(IP_LOCATION_CACHE_FILE));

        Self {
            client: reqwest::Client::new(),
            url: IP_API_URL.to_string(),
            cache_path,
        }
    }

    pub fn with_cache_path(cache_path: PathBuf) -> Self {
        Self {
            cache_path: Some(cache_path),
            ..Self::new()
        }
    }

    pub fn without_cache() -> Self {
        Self {
            cache_path: None,
            ..Self::new()
        }
    }

    /// Point at another ip-api compatible endpoint
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    async fn fetch(&self) -> Result<(Coordinates, Option<String>)> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::LocationUnavailable(format!("IP location request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::LocationUnavailable(format!(
                "IP location API returned status: {}",
                response.status()
            )));
        }

        let data: IpApiResponse = response.json().await.map_err(|e| {
            Error::MalformedResponse(format!("Failed to parse IP location response: {}", e))
        })?;

        if data.status != "success" {
            return Err(Error::LocationUnavailable(format!(
                "IP location lookup failed: {}",
                data.message.unwrap_or_else(|| data.status.clone())
            )));
        }

        match (data.lat, data.lon) {
            (Some(lat), Some(lng)) => {
                let coords = Coordinates::new(lat, lng);
                coords.validate()?;
                Ok((coords, data.city))
            }
            _ => Err(Error::MalformedResponse(
                "IP location response has no coordinates".to_string(),
            )),
        }
    }

    fn load_cache(&self) -> Option<CachedFix> {
        let cache_path = self.cache_path.as_ref()?;
        let content = fs::read_to_string(cache_path).ok()?;
        let cached: CachedFix = serde_json::from_str(&content).ok()?;

        if now_secs().saturating_sub(cached.timestamp) < IP_LOCATION_TTL_SECS {
            Some(cached)
        } else {
            None
        }
    }

    fn save_cache(&self, coords: Coordinates, city: Option<String>) {
        let Some(cache_path) = &self.cache_path else {
            return;
        };

        if let Some(parent) = cache_path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        let cached = CachedFix {
            coords,
            city,
            timestamp: now_secs(),
        };

        match serde_json::to_string_pretty(&cached) {
            Ok(content) => {
                if let Err(e) = fs::write(cache_path, content) {
                    warn!("Failed to write IP location cache: {}", e);
                }
            }
            Err(e) => warn!("Failed to encode IP location cache: {}", e),
        }
    }

    pub fn clear_cache(&self) {
        if let Some(cache_path) = &self.cache_path {
            let _ = fs::remove_file(cache_path);
        }
    }

    pub fn cache_duration() -> Duration {
        Duration::from_secs(IP_LOCATION_TTL_SECS)
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationProvider for IpLocator {
    async fn current_location(&self) -> Result<Coordinates> {
        if let Some(cached) = self.load_cache() {
            debug!(coords = %cached.coords, "Using cached IP location");
            return Ok(cached.coords);
        }

        let (coords, city) = self.fetch().await?;
        debug!(coords = %coords, city = ?city, "Located by IP");
        self.save_cache(coords, city);
        Ok(coords)
    }
}

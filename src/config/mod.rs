//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/landmark-address/config.toml

pub mod defaults;

use crate::constants::api::API_KEY_ENV;
use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Reverse geocoding settings
    #[serde(default)]
    pub geocoder: GeocoderConfig,

    /// Place details settings
    #[serde(default)]
    pub places: PlacesConfig,

    /// Location source settings
    #[serde(default)]
    pub location: LocationConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Map link settings
    #[serde(default)]
    pub url: UrlConfig,
}

/// Reverse geocoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// Google Maps API key (overridden by GOOGLE_MAPS_API_KEY)
    #[serde(default)]
    pub api_key: String,

    /// Reverse geocoding endpoint
    #[serde(default = "default_geocode_url")]
    pub base_url: String,

    /// Request nearby landmarks and areas
    #[serde(default = "default_include_descriptors")]
    pub include_descriptors: bool,

    /// Minimum movement before geocoding again
    #[serde(default = "default_coalesce_meters")]
    pub coalesce_meters: f64,

    /// Extra attempts after a failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between attempts
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// HTTP timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Place details settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    /// Places API base URL
    #[serde(default = "default_places_url")]
    pub base_url: String,
}

/// Location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Source active at startup: "mock" or "system"
    #[serde(default = "default_location_source")]
    pub source: String,

    /// Seconds between device polls while following the device (0 disables)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Map link settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlConfig {
    /// Default URL provider
    #[serde(default = "default_url_provider")]
    pub default: String,

    /// URL provider templates
    #[serde(default = "default_url_providers")]
    pub providers: HashMap<String, String>,
}

/// Which location source is active when the pipeline starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSourceKind {
    Mock,
    System,
}

impl FromStr for LocationSourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "system" | "device" => Ok(Self::System),
            _ => Err(format!("Unknown location source: {}", s)),
        }
    }
}

// Default value functions for serde
fn default_geocode_url() -> String {
    DEFAULT_GEOCODE_URL.to_string()
}
fn default_include_descriptors() -> bool {
    DEFAULT_INCLUDE_DESCRIPTORS
}
fn default_coalesce_meters() -> f64 {
    DEFAULT_COALESCE_METERS
}
fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}
fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_places_url() -> String {
    DEFAULT_PLACES_URL.to_string()
}
fn default_location_source() -> String {
    DEFAULT_LOCATION_SOURCE.to_string()
}
fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_url_provider() -> String {
    DEFAULT_URL_PROVIDER.to_string()
}
fn default_url_providers() -> HashMap<String, String> {
    let mut providers = HashMap::new();
    providers.insert(
        "google".to_string(),
        "https://www.google.com/maps/search/?api=1&query={lat},{lng}".to_string(),
    );
    providers.insert(
        "openstreetmap".to_string(),
        "https://www.openstreetmap.org/#map=18/{lat}/{lng}".to_string(),
    );
    providers.insert(
        "apple".to_string(),
        "https://maps.apple.com/?ll={lat},{lng}".to_string(),
    );
    providers
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_geocode_url(),
            include_descriptors: default_include_descriptors(),
            coalesce_meters: default_coalesce_meters(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            base_url: default_places_url(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            source: default_location_source(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            default: default_url_provider(),
            providers: default_url_providers(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific path, creating it if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// API key to use, with the environment taking precedence
    pub fn api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| Some(self.geocoder.api_key.clone()).filter(|key| !key.trim().is_empty()))
    }

    /// Parsed startup location source
    pub fn location_source(&self) -> Result<LocationSourceKind> {
        self.location.source.parse().map_err(Error::Config)
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["geocoder", "api_key"] => Some(self.geocoder.api_key.clone()),
            ["geocoder", "base_url"] => Some(self.geocoder.base_url.clone()),
            ["geocoder", "include_descriptors"] => {
                Some(self.geocoder.include_descriptors.to_string())
            }
            ["geocoder", "coalesce_meters"] => Some(self.geocoder.coalesce_meters.to_string()),
            ["geocoder", "max_retries"] => Some(self.geocoder.max_retries.to_string()),
            ["geocoder", "retry_delay_ms"] => Some(self.geocoder.retry_delay_ms.to_string()),
            ["geocoder", "timeout_secs"] => Some(self.geocoder.timeout_secs.to_string()),

            ["places", "base_url"] => Some(self.places.base_url.clone()),

            ["location", "source"] => Some(self.location.source.clone()),
            ["location", "poll_interval_secs"] => {
                Some(self.location.poll_interval_secs.to_string())
            }

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["url", "default"] => Some(self.url.default.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["geocoder", "api_key"] => {
                self.geocoder.api_key = value.to_string();
            }
            ["geocoder", "base_url"] => {
                self.geocoder.base_url = value.to_string();
            }
            ["geocoder", "include_descriptors"] => {
                self.geocoder.include_descriptors = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid boolean value: {}", value))
                })?;
            }
            ["geocoder", "coalesce_meters"] => {
                let meters: f64 = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid distance value: {}", value))
                })?;
                if !meters.is_finite() || meters < 0.0 {
                    return Err(Error::Config(format!(
                        "Distance must be a non-negative number: {}",
                        value
                    )));
                }
                self.geocoder.coalesce_meters = meters;
            }
            ["geocoder", "max_retries"] => {
                self.geocoder.max_retries = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid retry count: {}", value))
                })?;
            }
            ["geocoder", "retry_delay_ms"] => {
                self.geocoder.retry_delay_ms = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid delay value: {}", value))
                })?;
            }
            ["geocoder", "timeout_secs"] => {
                self.geocoder.timeout_secs = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid timeout value: {}", value))
                })?;
            }

            ["places", "base_url"] => {
                self.places.base_url = value.to_string();
            }

            ["location", "source"] => {
                let kind: LocationSourceKind = value.parse().map_err(Error::Config)?;
                self.location.source = match kind {
                    LocationSourceKind::Mock => "mock",
                    LocationSourceKind::System => "system",
                }
                .to_string();
            }
            ["location", "poll_interval_secs"] => {
                self.location.poll_interval_secs = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid interval value: {}", value))
                })?;
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid port value: {}", value))
                })?;
            }

            ["url", "default"] => {
                if !self.url.providers.contains_key(value) {
                    return Err(Error::Config(format!("Unknown URL provider: {}", value)));
                }
                self.url.default = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "geocoder.api_key",
            "geocoder.base_url",
            "geocoder.include_descriptors",
            "geocoder.coalesce_meters",
            "geocoder.max_retries",
            "geocoder.retry_delay_ms",
            "geocoder.timeout_secs",
            "places.base_url",
            "location.source",
            "location.poll_interval_secs",
            "server.host",
            "server.port",
            "url.default",
        ]
    }

    /// Format a map URL using the specified provider
    ///
    /// Replaces {lat} and {lng} placeholders with actual values
    pub fn format_url(&self, provider: Option<&str>, lat: f64, lng: f64) -> Result<String> {
        let provider_name = provider.unwrap_or(&self.url.default);

        let template = self.url.providers.get(provider_name).ok_or_else(|| {
            Error::Config(format!("Unknown URL provider: {}", provider_name))
        })?;

        Ok(template
            .replace("{lat}", &lat.to_string())
            .replace("{lng}", &lng.to_string()))
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.geocoder.coalesce_meters, 50.0);
        assert_eq!(config.geocoder.max_retries, 2);
        assert!(config.geocoder.include_descriptors);
        assert_eq!(config.location.source, "mock");
        assert_eq!(config.server.port, 7979);
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        assert_eq!(config.get("location.source"), Some("mock".to_string()));

        config.set("location.source", "SYSTEM").unwrap();
        assert_eq!(config.get("location.source"), Some("system".to_string()));
        assert_eq!(config.location_source().unwrap(), LocationSourceKind::System);

        config.set("geocoder.coalesce_meters", "75").unwrap();
        assert_eq!(config.geocoder.coalesce_meters, 75.0);

        assert_eq!(config.get("location.poll_interval_secs"), Some("10".to_string()));
        config.set("location.poll_interval_secs", "0").unwrap();
        assert_eq!(config.location.poll_interval_secs, 0);
    }

    #[test]
    fn test_get_invalid_key() {
        let config = Config::default();
        assert_eq!(config.get("invalid.key"), None);
    }

    #[test]
    fn test_set_invalid_key() {
        let mut config = Config::default();
        assert!(config.set("invalid.key", "value").is_err());
    }

    #[test]
    fn test_set_invalid_values() {
        let mut config = Config::default();
        assert!(config.set("geocoder.coalesce_meters", "far").is_err());
        assert!(config.set("geocoder.coalesce_meters", "-1").is_err());
        assert!(config.set("location.source", "satellite").is_err());
        assert!(config.set("location.poll_interval_secs", "soon").is_err());
        assert!(config.set("url.default", "mapquest").is_err());
    }

    #[test]
    fn test_format_url() {
        let config = Config::default();

        let url = config
            .format_url(Some("openstreetmap"), 37.7939, -122.3923)
            .unwrap();
        assert_eq!(url, "https://www.openstreetmap.org/#map=18/37.7939/-122.3923");

        let url = config.format_url(None, 37.7939, -122.3923).unwrap();
        assert!(url.contains("google.com"));

        assert!(config.format_url(Some("unknown"), 0.0, 0.0).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        // Missing file is created with defaults
        let created = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created.geocoder.max_retries, 2);

        let mut config = created;
        config.geocoder.max_retries = 5;
        config.location.source = "system".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.geocoder.max_retries, 5);
        assert_eq!(loaded.location.source, "system");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: Config = toml::from_str("[geocoder]\napi_key = \"abc\"\n").unwrap();
        assert_eq!(loaded.geocoder.api_key, "abc");
        assert_eq!(loaded.geocoder.coalesce_meters, 50.0);
        assert_eq!(loaded.server.port, 7979);
    }

    #[test]
    fn test_serialization_format() {
        let toml = toml::to_string_pretty(&Config::default()).unwrap();

        assert!(toml.contains("[geocoder]"));
        assert!(toml.contains("[places]"));
        assert!(toml.contains("[location]"));
        assert!(toml.contains("[url.providers]"));
    }

    #[test]
    fn test_server_addr() {
        assert_eq!(Config::default().server_addr(), "127.0.0.1:7979");
    }

    #[test]
    fn test_available_keys() {
        let config = Config::default();
        for key in Config::available_keys() {
            assert!(config.get(key).is_some(), "key {} not readable", key);
        }
    }
}

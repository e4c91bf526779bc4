//! Default configuration values
//!
//! Named constants for all tunable parameters

use crate::constants::api::{GEOCODE_URL, PLACES_URL};
use crate::constants::geo::COALESCE_DISTANCE_METERS;

/// Reverse geocoding endpoint
pub const DEFAULT_GEOCODE_URL: &str = GEOCODE_URL;

/// Places API base URL
pub const DEFAULT_PLACES_URL: &str = PLACES_URL;

/// Ask for nearby landmarks and areas with every reverse geocode
pub const DEFAULT_INCLUDE_DESCRIPTORS: bool = true;

/// Minimum movement in meters before the location is geocoded again
pub const DEFAULT_COALESCE_METERS: f64 = COALESCE_DISTANCE_METERS;

/// Extra attempts after a failed reverse geocode
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Delay between reverse geocode attempts in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// HTTP request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Initial location source ("mock" or "system")
pub const DEFAULT_LOCATION_SOURCE: &str = "mock";

/// Seconds between device location polls
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7979;

/// Default map URL provider
pub const DEFAULT_URL_PROVIDER: &str = "google";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "landmark-address";

//! Error types for landmark-address

use thiserror::Error;

/// Main error type for landmark-address operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Location permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Place lookup error: {0}")]
    PlaceLookup(String),

    #[error("Unknown address field: {0}")]
    UnknownField(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

impl Error {
    /// Whether the error means the user has to grant location access
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }
}

/// Result type alias for landmark-address operations
pub type Result<T> = std::result::Result<T, Error>;

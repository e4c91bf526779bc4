//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::address::AddressFormats;
use crate::coord::LabeledLocation;
use crate::error::Error;
use crate::geo::country::{self, Country};
use crate::location::MockLocations;
use crate::pipeline::{PipelineEvent, ViewState};
use crate::server::state::AppState;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/state", get(state_handler))
        .route("/api/events", post(event_handler))
        .route("/api/status", get(status_handler))
        .route("/api/mock-locations", get(mock_locations_handler))
        .route("/api/countries", get(countries_handler))
        .route("/api/countries/:code", get(country_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ApiError {
    fn not_found(error: String) -> Self {
        Self {
            error,
            code: "NOT_FOUND".to_string(),
            status: StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, code) = match &err {
            Error::InvalidCoordinates(_) => (StatusCode::BAD_REQUEST, "INVALID_COORDINATES"),
            Error::UnknownField(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_FIELD"),
            Error::Pipeline(_) => (StatusCode::SERVICE_UNAVAILABLE, "PIPELINE_STOPPED"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        ApiError {
            error: err.to_string(),
            code: code.to_string(),
            status,
        }
    }
}

/// Current view state
///
/// GET /api/state
async fn state_handler(State(state): State<Arc<AppState>>) -> Json<ViewState> {
    Json(state.pipeline.current())
}

/// Queue a pipeline event
///
/// POST /api/events
async fn event_handler(
    State(state): State<Arc<AppState>>,
    Json(event): Json<PipelineEvent>,
) -> Result<StatusCode, ApiError> {
    match &event {
        PipelineEvent::SetMockLocation { coords } | PipelineEvent::DropPin { coords } => {
            coords.validate()?;
        }
        _ => {}
    }

    state.pipeline.send(event).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Country codes with a dedicated address format
    pub address_formats: Vec<String>,
    /// Provider used for map links
    pub map_provider: String,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        address_formats: AddressFormats::new().country_codes(),
        map_provider: state.config.url.default.clone(),
        uptime_secs: state.uptime_secs(),
    })
}

/// Mock locations in cycle order
///
/// GET /api/mock-locations
async fn mock_locations_handler() -> Json<Vec<LabeledLocation>> {
    Json(MockLocations::entries())
}

/// Known countries
///
/// GET /api/countries
async fn countries_handler() -> Json<Vec<Country>> {
    Json(country::all())
}

/// One country by ISO code
///
/// GET /api/countries/:code
async fn country_handler(Path(code): Path<String>) -> Result<Json<Country>, ApiError> {
    country::by_code(&code)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Unknown country code: {}", code)))
}

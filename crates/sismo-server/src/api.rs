//! Read-only REST projections over the event manager.
//!
//! Provides:
//! - `GET /api/earthquakes`: retained events, optionally filtered by basin or region
//! - `GET /api/stats`: grouped counts plus connected subscribers
//! - `GET /api/health`: liveness with store and subscriber counts

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sismo_store::EventStats;
use sismo_types::{Basin, Event, ParseLabelError, Region};
use thiserror::Error;

use crate::AppState;

/// Query parameters for `GET /api/earthquakes`.
#[derive(Debug, Deserialize)]
pub struct EarthquakesQuery {
    /// Basin label (e.g. `Pacifico`, `Caribe`). Takes precedence over `region`.
    pub oceano: Option<String>,
    /// Region label (e.g. `local`, `regional`, `lejano`).
    pub region: Option<String>,
}

/// Response body for `GET /api/stats`.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: EventStats,
    pub websocket_clients: usize,
}

/// Response body for `GET /api/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub earthquake_count: usize,
    pub websocket_clients: usize,
}

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid filter: {0}")]
    BadRequest(#[from] ParseLabelError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(serde_json::json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

/// Handler for `GET /api/earthquakes`.
///
/// Returns events most recent first. Empty filter values are ignored.
pub async fn list_earthquakes_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<EarthquakesQuery>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let basin = params.oceano.filter(|s| !s.is_empty());
    let region = params.region.filter(|s| !s.is_empty());

    let events = if let Some(basin) = basin {
        let basin: Basin = basin.parse()?;
        state.manager.query_by_basin(basin)
    } else if let Some(region) = region {
        let region: Region = region.parse()?;
        state.manager.query_by_region(region)
    } else {
        state.manager.query_all()
    };

    Ok(Json(events))
}

/// Handler for `GET /api/stats`.
pub async fn stats_handler(Extension(state): Extension<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        stats: state.manager.stats(),
        websocket_clients: state.hub.connected_count(),
    })
}

/// Handler for `GET /api/health`.
pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        earthquake_count: state.manager.count(),
        websocket_clients: state.hub.connected_count(),
    })
}

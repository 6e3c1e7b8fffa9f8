//! sismo server library logic.

pub mod api;
pub mod api_ws;
pub mod background;
pub mod config;
pub mod hub;
pub mod retention;

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use hub::Hub;
use sismo_store::EventManager;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The authoritative event index.
    pub manager: Arc<EventManager>,
    /// Subscriber fan-out.
    pub hub: Hub,
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/earthquakes", get(api::list_earthquakes_handler))
        .route("/api/stats", get(api::stats_handler))
        .route("/api/health", get(api::health_handler))
        .route("/ws", get(api_ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}

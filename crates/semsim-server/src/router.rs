//! Axum router construction for the control panel API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled so the panel frontend can talk to us
//! from its dev server origin.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the control panel server.
///
/// CORS is configured to allow any origin for development. In production
/// this should be restricted to the panel's origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws", get(ws::ws_handler))
        // Image controls
        .route("/api/image/control", post(handlers::update_image_control))
        .route("/api/image/auto/{function}", post(handlers::image_auto))
        // Beam controls
        .route("/api/beam/control", post(handlers::update_beam_control))
        .route("/api/beam/auto/{function}", post(handlers::beam_auto))
        .route("/api/beam/hv", post(handlers::set_beam_hv))
        .route("/api/beam/filament", post(handlers::set_beam_filament))
        .route("/api/beam/bias", post(handlers::set_beam_bias))
        .route(
            "/api/beam/scintillator_hv",
            post(handlers::set_scintillator_hv),
        )
        .route(
            "/api/beam/filament_time_reset",
            post(handlers::filament_time_reset),
        )
        .route("/api/beam/spot_size", post(handlers::set_spot_size))
        // Queries
        .route("/api/state", get(handlers::get_state))
        .route("/api/beam/status", get(handlers::get_beam_status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

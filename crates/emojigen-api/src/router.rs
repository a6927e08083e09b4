//! Axum router construction for the Emojigen API.
//!
//! Assembles all routes into a single [`Router`] with CORS enabled so a
//! separately hosted frontend can call the API.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /health` -- liveness probe
/// - `GET /api/profile` -- caller's profile
/// - `GET /api/emojis` -- emoji listing
/// - `POST /api/generate` -- emoji generation
/// - `POST /api/emojis/like` -- like or unlike
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/profile", get(handlers::get_profile))
        .route("/api/emojis", get(handlers::list_emojis))
        .route("/api/generate", post(handlers::generate))
        .route("/api/emojis/like", post(handlers::like))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

//! REST API endpoint handlers.
//!
//! Handlers are thin: authenticate via [`CallerId`], decode the body, and
//! delegate to [`crate::service`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness probe |
//! | `GET` | `/api/profile` | Caller's profile (created on first call) |
//! | `GET` | `/api/emojis` | All emojis with the caller's like flag |
//! | `POST` | `/api/generate` | Generate an emoji from a prompt |
//! | `POST` | `/api/emojis/like` | Like or unlike an emoji |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use emojigen_types::{GenerateRequest, LikeRequest};

use crate::auth::CallerId;
use crate::error::ApiError;
use crate::service;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Report that the process is serving requests.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "store": state.store.name(),
    }))
}

// ---------------------------------------------------------------------------
// GET /api/profile
// ---------------------------------------------------------------------------

/// Return the caller's profile, creating it on first access.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    CallerId(caller): CallerId,
) -> Result<impl IntoResponse, ApiError> {
    let profile = service::get_profile(&state, &caller).await?;
    Ok(Json(profile))
}

// ---------------------------------------------------------------------------
// GET /api/emojis
// ---------------------------------------------------------------------------

/// List every emoji, newest first, with the caller's `liked` flag.
pub async fn list_emojis(
    State(state): State<Arc<AppState>>,
    CallerId(caller): CallerId,
) -> Result<impl IntoResponse, ApiError> {
    let emojis = service::list_emojis(&state, &caller).await?;
    Ok(Json(emojis))
}

// ---------------------------------------------------------------------------
// POST /api/generate
// ---------------------------------------------------------------------------

/// Generate an emoji from `{prompt}` and return `{url, id}`.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    CallerId(caller): CallerId,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.map_err(json_error)?;
    let response = service::generate_emoji(&state, &caller, &request).await?;
    Ok(Json(response))
}

// ---------------------------------------------------------------------------
// POST /api/emojis/like
// ---------------------------------------------------------------------------

/// Apply `{emojiId, liked}` and return `{likes_count, liked}`.
pub async fn like(
    State(state): State<Arc<AppState>>,
    CallerId(caller): CallerId,
    body: Result<Json<LikeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.map_err(json_error)?;
    let response = service::set_like(&state, &caller, request).await?;
    Ok(Json(response))
}

fn json_error(rejection: JsonRejection) -> ApiError {
    ApiError::InvalidRequest(rejection.body_text())
}

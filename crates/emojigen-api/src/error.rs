//! Error types for the Emojigen API.
//!
//! [`ApiError`] is what every handler returns. Each variant carries a
//! stable machine code alongside the HTTP status, and the
//! [`IntoResponse`] implementation renders both into the JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use emojigen_db::DbError;
use emojigen_inference::InferenceError;
use emojigen_storage::StorageError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No valid caller identity was presented.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller has no credits left.
    #[error("no credits remaining")]
    InsufficientCredits,

    /// The caller already likes this emoji.
    #[error("emoji {0} is already liked")]
    AlreadyLiked(i64),

    /// The request body or a field in it is invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A call to the inference or storage service failed.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// The inference service answered with output we cannot use.
    #[error("malformed upstream response: {0}")]
    MalformedUpstream(String),

    /// A data-layer operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Stable machine-readable code for this error.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::InsufficientCredits => "insufficient_credits",
            Self::AlreadyLiked(_) => "already_liked",
            Self::InvalidRequest(_) => "invalid_request",
            Self::NotFound(_) => "not_found",
            Self::Upstream(_) => "upstream_failure",
            Self::MalformedUpstream(_) => "malformed_upstream_response",
            Self::Database(_) => "database_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InsufficientCredits => StatusCode::FORBIDDEN,
            Self::AlreadyLiked(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_)
            | Self::MalformedUpstream(_)
            | Self::Database(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(what) => Self::NotFound(what),
            other => Self::Database(other.to_string()),
        }
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Malformed(msg) => Self::MalformedUpstream(msg),
            InferenceError::Template(msg) => Self::Internal(format!("prompt template: {msg}")),
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        Self::Upstream(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_codes() {
        let cases = [
            (ApiError::Unauthorized(String::new()), 401, "unauthorized"),
            (ApiError::InsufficientCredits, 403, "insufficient_credits"),
            (ApiError::AlreadyLiked(1), 400, "already_liked"),
            (ApiError::InvalidRequest(String::new()), 400, "invalid_request"),
            (ApiError::NotFound(String::new()), 404, "not_found"),
            (ApiError::Upstream(String::new()), 500, "upstream_failure"),
            (
                ApiError::MalformedUpstream(String::new()),
                500,
                "malformed_upstream_response",
            ),
            (ApiError::Database(String::new()), 500, "database_error"),
            (ApiError::Internal(String::new()), 500, "internal_error"),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status().as_u16(), status);
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn malformed_model_output_is_not_a_generic_upstream_error() {
        let err = ApiError::from(InferenceError::Malformed("number".to_owned()));
        assert_eq!(err.code(), "malformed_upstream_response");

        let err = ApiError::from(InferenceError::Timeout);
        assert_eq!(err.code(), "upstream_failure");
    }

    #[test]
    fn missing_row_maps_to_not_found() {
        let err = ApiError::from(DbError::NotFound("emoji 9".to_owned()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}

//! Caller identity.
//!
//! Every `/api` route needs to know who is calling. [`Authenticator`]
//! turns request headers into a [`UserId`], and the [`CallerId`]
//! extractor runs it before the handler body does anything else.
//!
//! Two modes:
//!
//! - [`Authenticator::Jwt`] -- `Authorization: Bearer <jwt>` issued by the
//!   identity provider; the `sub` claim is the user id
//! - [`Authenticator::TrustedHeader`] -- the id is read verbatim from a
//!   header set by a trusted proxy (local development)

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName};
use emojigen_types::UserId;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Header read by [`Authenticator::TrustedHeader`] unless configured.
pub const DEFAULT_USER_HEADER: &str = "x-user-id";

/// Claims we read from a bearer token.
#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

/// Verifies bearer tokens against one key.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Verifier for HS256 tokens signed with a shared secret.
    pub fn hs256(secret: &[u8]) -> Self {
        Self::with_key(DecodingKey::from_secret(secret), Algorithm::HS256)
    }

    /// Verifier for RS256 tokens, given the provider's PEM public key.
    pub fn rs256_pem(pem: &[u8]) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self::with_key(DecodingKey::from_rsa_pem(pem)?, Algorithm::RS256))
    }

    fn with_key(key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_aud = false;
        Self { key, validation }
    }

    /// Also require the `iss` claim to equal `issuer`.
    #[must_use]
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    /// Also require the `aud` claim to contain `audience`.
    #[must_use]
    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.validate_aud = true;
        self.validation.set_required_spec_claims(&["exp", "aud"]);
        self
    }

    /// Check signature, expiry and configured claims. Returns `sub`.
    pub fn verify(&self, token: &str) -> Result<UserId, ApiError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| ApiError::Unauthorized(format!("invalid token: {e}")))?;
        if data.claims.sub.trim().is_empty() {
            return Err(ApiError::Unauthorized("token has an empty subject".to_owned()));
        }
        Ok(UserId::new(data.claims.sub))
    }
}

/// How callers are identified.
pub enum Authenticator {
    /// Bearer JWT from the identity provider.
    Jwt(JwtVerifier),
    /// Identity taken from a header set by a trusted proxy.
    TrustedHeader {
        /// Header carrying the user id.
        header: HeaderName,
    },
}

impl Authenticator {
    /// Trusted-header mode reading [`DEFAULT_USER_HEADER`].
    pub const fn trusted_header() -> Self {
        Self::TrustedHeader {
            header: HeaderName::from_static(DEFAULT_USER_HEADER),
        }
    }

    /// Resolve the caller from request headers.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<UserId, ApiError> {
        match self {
            Self::Jwt(verifier) => verifier.verify(bearer_token(headers)?),
            Self::TrustedHeader { header } => {
                let value = headers
                    .get(header)
                    .ok_or_else(|| ApiError::Unauthorized(format!("missing {header} header")))?
                    .to_str()
                    .map_err(|e| ApiError::Unauthorized(format!("unreadable {header}: {e}")))?
                    .trim();
                if value.is_empty() {
                    return Err(ApiError::Unauthorized(format!("empty {header} header")));
                }
                Ok(UserId::from(value))
            }
        }
    }

    /// Mode name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Jwt(_) => "jwt",
            Self::TrustedHeader { .. } => "header",
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".to_owned()))?
        .to_str()
        .map_err(|e| ApiError::Unauthorized(format!("unreadable Authorization header: {e}")))?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .unwrap_or_default();
    if token.is_empty() {
        return Err(ApiError::Unauthorized("expected a bearer token".to_owned()));
    }
    Ok(token)
}

/// The authenticated caller of a request.
///
/// Rejects with [`ApiError::Unauthorized`] before the handler runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(pub UserId);

impl FromRequestParts<Arc<AppState>> for CallerId {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        state.auth.authenticate(&parts.headers).map(Self)
    }
}

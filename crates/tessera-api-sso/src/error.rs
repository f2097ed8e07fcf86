//! Error types for federation and session handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Federation errors.
///
/// Every variant is surfaced to the end user as the same generic
/// login-failure response; the specific variant (and any provider detail)
/// stays in the logs.
#[derive(Debug, Error)]
pub enum FederationError {
    /// The callback `state` did not match an issued, unused, unexpired
    /// login session. Covers CSRF, replay, and plain expiry.
    #[error("State parameter does not match an active login session")]
    StateMismatch,

    /// The identity provider's discovery document could not be fetched or
    /// parsed.
    #[error("Provider discovery failed: {0}")]
    DiscoveryFailed(String),

    /// The code-for-token exchange with the identity provider failed
    /// (network error, timeout, or non-success response). Fails closed.
    #[error("Token exchange failed: {0}")]
    ExchangeFailed(String),

    /// The provider's JWKS could not be fetched or contained no usable key.
    #[error("JWKS fetch failed: {0}")]
    JwksFetchFailed(String),

    /// The ID token failed signature or claim validation.
    #[error("Invalid ID token: {0}")]
    InvalidIdToken(String),

    /// A mandatory identity claim is missing from the verified ID token.
    #[error("Missing required claim: {0}")]
    MissingClaim(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for FederationError {
    fn into_response(self) -> Response {
        // The specific failure is operational detail; the browser gets one
        // generic login-failure body with no provider internals.
        tracing::warn!(error = %self, "Federation login failed");

        let status = match self {
            FederationError::Database(_) | FederationError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNAUTHORIZED,
        };

        (
            status,
            Json(json!({ "error": "login_failed", "message": "Sign-in could not be completed" })),
        )
            .into_response()
    }
}

/// Session validation errors.
///
/// `Expired` and `Invalid` are deliberately indistinguishable in the HTTP
/// response: both produce the same 401.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The session token has expired.
    #[error("Session expired")]
    Expired,

    /// The session token is malformed, has a bad signature, or references a
    /// user that no longer exists or is deactivated.
    #[error("Session invalid")]
    Invalid,
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        // One response shape for both variants - no information leakage
        // about why the session was rejected.
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthenticated" })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_errors_share_response_shape() {
        let expired = SessionError::Expired.into_response();
        let invalid = SessionError::Invalid.into_response();

        assert_eq!(expired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_federation_error_statuses() {
        assert_eq!(
            FederationError::StateMismatch.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            FederationError::Internal("x".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_claim_display() {
        assert_eq!(
            FederationError::MissingClaim("sub").to_string(),
            "Missing required claim: sub"
        );
    }
}

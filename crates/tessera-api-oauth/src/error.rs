//! OAuth2 error types.
//!
//! Error types for OAuth2 flows following RFC 6749. Internal storage
//! failures are kept distinct from client-caused errors: they surface as
//! `server_error` with a 5xx status, never as `invalid_grant`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OAuth2 error codes as defined in RFC 6749.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuthErrorCode {
    /// The request is missing a required parameter.
    InvalidRequest,
    /// Client authentication failed.
    InvalidClient,
    /// The provided authorization grant or refresh token is invalid.
    InvalidGrant,
    /// The client is not authorized to request an authorization code.
    UnauthorizedClient,
    /// The authorization server does not support the grant type.
    UnsupportedGrantType,
    /// The requested scope is invalid, unknown, or malformed.
    InvalidScope,
    /// The resource owner or the access engine denied the request.
    AccessDenied,
    /// The authorization server does not support the response type.
    UnsupportedResponseType,
    /// The authorization server encountered an unexpected condition.
    ServerError,
    /// The access token is invalid (resource server errors).
    InvalidToken,
    /// The request requires higher privileges.
    InsufficientScope,
}

impl std::fmt::Display for OAuthErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::InvalidScope => "invalid_scope",
            Self::AccessDenied => "access_denied",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::ServerError => "server_error",
            Self::InvalidToken => "invalid_token",
            Self::InsufficientScope => "insufficient_scope",
        };
        write!(f, "{s}")
    }
}

/// OAuth2 error response following RFC 6749 Section 5.2.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthErrorResponse {
    /// Error code.
    pub error: OAuthErrorCode,
    /// Human-readable error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl OAuthErrorResponse {
    /// Create a new error response.
    pub fn new(error: OAuthErrorCode, description: impl Into<String>) -> Self {
        Self {
            error,
            error_description: Some(description.into()),
        }
    }
}

/// OAuth2 API errors.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Client authentication failed.
    #[error("Invalid client: {0}")]
    InvalidClient(String),

    /// Invalid authorization code or refresh token.
    #[error("Invalid grant: {0}")]
    InvalidGrant(String),

    /// Client not authorized for the operation.
    #[error("Unauthorized client: {0}")]
    UnauthorizedClient(String),

    /// Unsupported grant type.
    #[error("Unsupported grant type: {0}")]
    UnsupportedGrantType(String),

    /// Invalid scope.
    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    /// Access denied by the access decision engine.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Unsupported response type.
    #[error("Unsupported response type: {0}")]
    UnsupportedResponseType(String),

    /// Invalid or expired access token.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Insufficient scope for the request.
    #[error("Insufficient scope: {0}")]
    InsufficientScope(String),

    /// Application not found.
    #[error("Application not found")]
    ApplicationNotFound,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OAuthError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::InvalidGrant(_)
            | Self::UnsupportedGrantType(_)
            | Self::InvalidScope(_)
            | Self::UnsupportedResponseType(_) => StatusCode::BAD_REQUEST,
            Self::InvalidClient(_) | Self::UnauthorizedClient(_) | Self::InvalidToken(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::AccessDenied(_) | Self::InsufficientScope(_) => StatusCode::FORBIDDEN,
            Self::ApplicationNotFound => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the OAuth2 error code for this error.
    #[must_use]
    pub fn error_code(&self) -> OAuthErrorCode {
        match self {
            Self::InvalidRequest(_) => OAuthErrorCode::InvalidRequest,
            Self::InvalidClient(_) => OAuthErrorCode::InvalidClient,
            Self::InvalidGrant(_) => OAuthErrorCode::InvalidGrant,
            Self::UnauthorizedClient(_) => OAuthErrorCode::UnauthorizedClient,
            Self::UnsupportedGrantType(_) => OAuthErrorCode::UnsupportedGrantType,
            Self::InvalidScope(_) => OAuthErrorCode::InvalidScope,
            Self::AccessDenied(_) => OAuthErrorCode::AccessDenied,
            Self::UnsupportedResponseType(_) => OAuthErrorCode::UnsupportedResponseType,
            Self::InvalidToken(_) => OAuthErrorCode::InvalidToken,
            Self::InsufficientScope(_) => OAuthErrorCode::InsufficientScope,
            Self::ApplicationNotFound => OAuthErrorCode::InvalidRequest,
            Self::Database(_) | Self::Internal(_) => OAuthErrorCode::ServerError,
        }
    }

    /// Convert to an OAuth2 error response body.
    #[must_use]
    pub fn to_response(&self) -> OAuthErrorResponse {
        // Storage failures keep their detail in the logs only
        match self {
            Self::Database(_) | Self::Internal(_) => {
                OAuthErrorResponse::new(OAuthErrorCode::ServerError, "Internal server error")
            }
            other => OAuthErrorResponse::new(other.error_code(), other.to_string()),
        }
    }
}

impl IntoResponse for OAuthError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            tracing::error!(error = %self, "OAuth endpoint internal error");
        }
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(
            OAuthErrorCode::InvalidRequest.to_string(),
            "invalid_request"
        );
        assert_eq!(OAuthErrorCode::InvalidClient.to_string(), "invalid_client");
        assert_eq!(OAuthErrorCode::InvalidGrant.to_string(), "invalid_grant");
        assert_eq!(OAuthErrorCode::AccessDenied.to_string(), "access_denied");
    }

    #[test]
    fn test_error_response_serialization() {
        let response =
            OAuthErrorResponse::new(OAuthErrorCode::InvalidRequest, "Missing required parameter");

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"error\":\"invalid_request\""));
        assert!(json.contains("\"error_description\":\"Missing required parameter\""));
    }

    #[test]
    fn test_oauth_error_status_codes() {
        assert_eq!(
            OAuthError::InvalidRequest("test".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            OAuthError::InvalidClient("test".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            OAuthError::AccessDenied("test".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            OAuthError::Internal("test".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_storage_errors_never_map_to_invalid_grant() {
        let err = OAuthError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.error_code(), OAuthErrorCode::ServerError);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        // And the response body hides the detail
        let body = err.to_response();
        assert_eq!(
            body.error_description.as_deref(),
            Some("Internal server error")
        );
    }
}

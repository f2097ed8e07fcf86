//! Authorization endpoint models.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for `GET /oauth/authorize`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct AuthorizationRequest {
    /// Response type (must be "code").
    pub response_type: String,
    /// Public client identifier.
    pub client_id: String,
    /// Redirect URI (must exactly match a registered URI).
    pub redirect_uri: String,
    /// Requested scopes (space-separated). Defaults to "openid".
    #[serde(default)]
    pub scope: Option<String>,
    /// Opaque state echoed back to the client.
    #[serde(default)]
    pub state: Option<String>,
    /// PKCE code challenge (optional).
    #[serde(default)]
    pub code_challenge: Option<String>,
    /// PKCE code challenge method: "S256" or "plain". Defaults to "plain"
    /// when a challenge is present without a method.
    #[serde(default)]
    pub code_challenge_method: Option<String>,
}

impl AuthorizationRequest {
    /// Parse the requested scopes, defaulting to `openid`.
    #[must_use]
    pub fn scopes(&self) -> Vec<String> {
        let raw = self.scope.as_deref().unwrap_or("openid");
        let scopes: Vec<String> = raw.split_whitespace().map(String::from).collect();
        if scopes.is_empty() {
            vec!["openid".to_string()]
        } else {
            scopes
        }
    }
}

/// Error parameters appended to the client redirect.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorizationErrorRedirect {
    /// Error code.
    pub error: String,
    /// Human-readable error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
    /// State (echoed from the request).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

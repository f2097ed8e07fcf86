//! Token endpoint models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Access-token lifetime in seconds (1 hour).
pub const ACCESS_TOKEN_EXPIRY_SECS: i64 = 3600;

/// Form body for `POST /oauth/token`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TokenRequest {
    /// Grant type: "authorization_code" or "refresh_token".
    pub grant_type: String,
    /// Authorization code (authorization_code grant).
    #[serde(default)]
    pub code: Option<String>,
    /// Redirect URI the code was issued for (authorization_code grant).
    #[serde(default)]
    pub redirect_uri: Option<String>,
    /// Client id (alternative to HTTP Basic auth).
    #[serde(default)]
    pub client_id: Option<String>,
    /// Client secret (alternative to HTTP Basic auth).
    #[serde(default)]
    pub client_secret: Option<String>,
    /// PKCE code verifier (authorization_code grant).
    #[serde(default)]
    pub code_verifier: Option<String>,
    /// Refresh token (refresh_token grant).
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Successful token response (RFC 6749 Section 5.1).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// The access token.
    pub access_token: String,
    /// Always "Bearer".
    pub token_type: String,
    /// Access-token lifetime in seconds.
    pub expires_in: i64,
    /// The refresh token.
    pub refresh_token: String,
    /// Granted scopes (space-separated).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Build a Bearer response for a freshly minted pair.
    #[must_use]
    pub fn bearer(access_token: String, refresh_token: String, scopes: &[String]) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: ACCESS_TOKEN_EXPIRY_SECS,
            refresh_token,
            scope: if scopes.is_empty() {
                None
            } else {
                Some(scopes.join(" "))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_request_form_decoding() {
        let form = "grant_type=authorization_code&code=abc&redirect_uri=https%3A%2F%2Fcrm.corp%2Fcb&client_id=tsr_x&client_secret=s";
        let request: TokenRequest = serde_urlencoded::from_str(form).unwrap();
        assert_eq!(request.grant_type, "authorization_code");
        assert_eq!(request.code.as_deref(), Some("abc"));
        assert!(request.refresh_token.is_none());
    }

    #[test]
    fn test_bearer_response_shape() {
        let response = TokenResponse::bearer(
            "at".to_string(),
            "rt".to_string(),
            &["openid".to_string(), "profile".to_string()],
        );

        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 3600);
        assert_eq!(response.scope.as_deref(), Some("openid profile"));

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"access_token\":\"at\""));
        assert!(json.contains("\"refresh_token\":\"rt\""));
        assert!(json.contains("\"expires_in\":3600"));
    }

    #[test]
    fn test_bearer_response_empty_scope_omitted() {
        let response = TokenResponse::bearer("at".to_string(), "rt".to_string(), &[]);
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("scope"));
    }
}

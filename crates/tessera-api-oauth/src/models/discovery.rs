//! OIDC discovery metadata model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// OpenID Connect discovery document served at
/// `/.well-known/openid-configuration`.
///
/// Static metadata derived from the configured issuer; no protocol logic.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OidcDiscovery {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    pub revocation_endpoint: String,
    pub scopes_supported: Vec<String>,
    pub response_types_supported: Vec<String>,
    pub grant_types_supported: Vec<String>,
    pub token_endpoint_auth_methods_supported: Vec<String>,
    pub subject_types_supported: Vec<String>,
    pub code_challenge_methods_supported: Vec<String>,
}

impl OidcDiscovery {
    /// Build the discovery document for an issuer base URL.
    #[must_use]
    pub fn for_issuer(issuer: &str) -> Self {
        let base = issuer.trim_end_matches('/');
        Self {
            issuer: base.to_string(),
            authorization_endpoint: format!("{base}/oauth/authorize"),
            token_endpoint: format!("{base}/oauth/token"),
            userinfo_endpoint: format!("{base}/oauth/userinfo"),
            revocation_endpoint: format!("{base}/oauth/revoke"),
            scopes_supported: vec![
                "openid".to_string(),
                "profile".to_string(),
                "email".to_string(),
            ],
            response_types_supported: vec!["code".to_string()],
            grant_types_supported: vec![
                "authorization_code".to_string(),
                "refresh_token".to_string(),
            ],
            token_endpoint_auth_methods_supported: vec![
                "client_secret_post".to_string(),
                "client_secret_basic".to_string(),
                "none".to_string(),
            ],
            subject_types_supported: vec!["public".to_string()],
            code_challenge_methods_supported: vec!["S256".to_string(), "plain".to_string()],
        }
    }
}

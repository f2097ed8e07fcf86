//! RFC 7009 token revocation models.

use serde::Deserialize;
use utoipa::ToSchema;

/// Form body for `POST /oauth/revoke` (RFC 7009 Section 2.1).
#[derive(Debug, Deserialize, ToSchema)]
pub struct RevocationRequest {
    /// The token to revoke (access or refresh token string).
    pub token: String,

    /// Hint about the token type: "access_token" or "refresh_token". The
    /// lookup covers both columns regardless, so the hint is advisory.
    #[serde(default)]
    pub token_type_hint: Option<String>,

    /// Client id (alternative to HTTP Basic auth).
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret (alternative to HTTP Basic auth).
    #[serde(default)]
    pub client_secret: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal() {
        let form = "token=abc123";
        let req: RevocationRequest = serde_urlencoded::from_str(form).unwrap();
        assert_eq!(req.token, "abc123");
        assert!(req.token_type_hint.is_none());
        assert!(req.client_id.is_none());
    }

    #[test]
    fn test_deserialize_full() {
        let form = "token=abc123&token_type_hint=refresh_token&client_id=tsr_x&client_secret=s";
        let req: RevocationRequest = serde_urlencoded::from_str(form).unwrap();
        assert_eq!(req.token_type_hint.as_deref(), Some("refresh_token"));
        assert_eq!(req.client_id.as_deref(), Some("tsr_x"));
    }
}

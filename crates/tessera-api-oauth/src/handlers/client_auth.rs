//! Shared client authentication utilities for OAuth2 endpoints.
//!
//! Extracts client credentials from HTTP Basic Auth or form body
//! parameters (RFC 6749 Section 2.3). Used by the token and revocation
//! handlers.

use crate::error::OAuthError;
use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine};

/// Extract client credentials from the Authorization header or form body.
///
/// HTTP Basic Auth takes precedence over body parameters. Returns
/// `(client_id, Option<client_secret>)`; a missing secret is legal for
/// public (PKCE) clients.
pub fn extract_client_credentials(
    headers: &HeaderMap,
    body_client_id: Option<&str>,
    body_client_secret: Option<&str>,
) -> Result<(String, Option<String>), OAuthError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| OAuthError::InvalidClient("Invalid authorization header".to_string()))?;

        if let Some(credentials) = auth_str.strip_prefix("Basic ") {
            let decoded = STANDARD.decode(credentials).map_err(|_| {
                OAuthError::InvalidClient("Invalid base64 in authorization header".to_string())
            })?;

            let decoded_str = String::from_utf8(decoded).map_err(|_| {
                OAuthError::InvalidClient("Invalid UTF-8 in credentials".to_string())
            })?;

            let parts: Vec<&str> = decoded_str.splitn(2, ':').collect();
            if parts.len() == 2 {
                return Ok((parts[0].to_string(), Some(parts[1].to_string())));
            }
            return Err(OAuthError::InvalidClient(
                "Invalid credential format".to_string(),
            ));
        }
    }

    let client_id = body_client_id
        .filter(|s| !s.is_empty())
        .map(String::from)
        .ok_or_else(|| OAuthError::InvalidRequest("client_id is required".to_string()))?;

    Ok((
        client_id,
        body_client_secret.filter(|s| !s.is_empty()).map(String::from),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_from_basic_auth() {
        let mut headers = HeaderMap::new();
        let encoded = STANDARD.encode("my-client:my-secret");
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
        );

        let (id, secret) = extract_client_credentials(&headers, None, None).unwrap();
        assert_eq!(id, "my-client");
        assert_eq!(secret, Some("my-secret".to_string()));
    }

    #[test]
    fn test_extract_from_body_params() {
        let headers = HeaderMap::new();
        let (id, secret) =
            extract_client_credentials(&headers, Some("body-client"), Some("body-secret")).unwrap();
        assert_eq!(id, "body-client");
        assert_eq!(secret, Some("body-secret".to_string()));
    }

    #[test]
    fn test_basic_auth_takes_precedence() {
        let mut headers = HeaderMap::new();
        let encoded = STANDARD.encode("header-client:header-secret");
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
        );

        let (id, _) =
            extract_client_credentials(&headers, Some("body-client"), Some("body-secret")).unwrap();
        assert_eq!(id, "header-client");
    }

    #[test]
    fn test_public_client_without_secret() {
        let headers = HeaderMap::new();
        let (id, secret) =
            extract_client_credentials(&headers, Some("public-client"), None).unwrap();
        assert_eq!(id, "public-client");
        assert!(secret.is_none());
    }

    #[test]
    fn test_missing_client_id_error() {
        let headers = HeaderMap::new();
        assert!(extract_client_credentials(&headers, None, None).is_err());
        assert!(extract_client_credentials(&headers, Some(""), None).is_err());
    }

    #[test]
    fn test_basic_auth_invalid_base64() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic !!!not-base64!!!"),
        );
        assert!(extract_client_credentials(&headers, None, None).is_err());
    }

    #[test]
    fn test_basic_auth_no_colon() {
        let mut headers = HeaderMap::new();
        let encoded = STANDARD.encode("just-a-client-id");
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
        );
        assert!(extract_client_credentials(&headers, None, None).is_err());
    }

    #[test]
    fn test_basic_auth_colon_in_secret() {
        let mut headers = HeaderMap::new();
        let encoded = STANDARD.encode("my-client:se:cr:et");
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
        );

        let (_, secret) = extract_client_credentials(&headers, None, None).unwrap();
        assert_eq!(secret, Some("se:cr:et".to_string()));
    }
}

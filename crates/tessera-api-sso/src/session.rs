//! Browser session issuance and validation.
//!
//! The session credential is a self-contained RS256 JWT delivered as an
//! `HttpOnly`, `SameSite=Lax` cookie. The `Secure` attribute is added only
//! when a trusted reverse proxy reports HTTPS via `X-Forwarded-Proto`;
//! whether that header is honored at all is a deployment configuration,
//! never an unauthenticated client claim.

use crate::router::SessionConfig;
use axum::http::{header, HeaderMap, HeaderValue};
use tessera_auth::{decode_session, encode_session, AuthError, SessionClaims};
use tessera_db::models::User;
use tessera_db::DbPool;

/// Session cookie name, stable across the deployment.
pub const SESSION_COOKIE_NAME: &str = "tessera_session";

/// Issue a session token for a verified local user.
pub fn issue_session(user: &User, config: &SessionConfig) -> Result<String, AuthError> {
    let claims = SessionClaims::builder()
        .subject(user.user_id())
        .issuer(&config.issuer)
        .expires_in_secs(config.ttl_secs)
        .build();

    encode_session(&claims, &config.private_key)
}

/// Build the session cookie header value.
#[must_use]
pub fn create_session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!(
        "{SESSION_COOKIE_NAME}={token}; HttpOnly{secure_flag}; SameSite=Lax; Path=/; Max-Age={max_age_secs}"
    )
}

/// Build the clearing variant of the session cookie (logout).
#[must_use]
pub fn clear_session_cookie(secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!("{SESSION_COOKIE_NAME}=; HttpOnly{secure_flag}; SameSite=Lax; Path=/; Max-Age=0")
}

/// Extract the session token from request cookies.
pub fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;

    for part in cookie_str.split(';') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix(&format!("{SESSION_COOKIE_NAME}=")) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }

    None
}

/// Whether the request arrived over HTTPS according to a trusted forwarded
/// indication.
///
/// Returns true only when the deployment is configured to trust the reverse
/// proxy (`trust_forwarded_proto`) AND the proxy set
/// `X-Forwarded-Proto: https`. An untrusted header is ignored entirely.
#[must_use]
pub fn is_secure_request(headers: &HeaderMap, trust_forwarded_proto: bool) -> bool {
    if !trust_forwarded_proto {
        return false;
    }
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("https"))
        .unwrap_or(false)
}

/// Resolve the current user from the request's session cookie.
///
/// Returns `Ok(None)` for a missing, malformed, expired or
/// badly-signed token, and for a deactivated or vanished user - all of
/// these are "unauthenticated", with no distinction observable by the
/// caller's response. Only a storage failure is an `Err`: infrastructure
/// errors are never folded into "unauthenticated".
pub async fn current_user(
    pool: &DbPool,
    headers: &HeaderMap,
    config: &SessionConfig,
) -> Result<Option<User>, sqlx::Error> {
    let Some(token) = extract_session_cookie(headers) else {
        return Ok(None);
    };

    let claims = match decode_session(&token, &config.public_key) {
        Ok(claims) => claims,
        Err(e) => {
            // Expired vs. invalid is operational detail only.
            tracing::debug!(error = %e, "Session token rejected");
            return Ok(None);
        }
    };

    let Some(user_id) = claims.user_id() else {
        tracing::debug!("Session token subject is not a valid user id");
        return Ok(None);
    };

    let user = User::find_by_id(pool, user_id.into_uuid()).await?;

    match user {
        Some(user) if user.is_active => Ok(Some(user)),
        Some(user) => {
            tracing::info!(user_id = %user.id, "Session rejected for deactivated user");
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Set the session cookie on a response's headers.
pub fn set_session_cookie(headers: &mut HeaderMap, token: &str, config: &SessionConfig, secure: bool) {
    let cookie = create_session_cookie(token, config.ttl_secs, secure);
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_session_cookie_attributes() {
        let cookie = create_session_cookie("tok.en.value", 43_200, true);

        assert!(cookie.starts_with("tessera_session=tok.en.value"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=43200"));
    }

    #[test]
    fn test_create_session_cookie_not_secure() {
        let cookie = create_session_cookie("t", 60, false);
        assert!(!cookie.contains("Secure"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn test_clear_session_cookie_expires_immediately() {
        let cookie = clear_session_cookie(true);
        assert!(cookie.contains("tessera_session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_extract_session_cookie_found() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("other=1; tessera_session=abc.def.ghi; x=2"),
        );
        assert_eq!(
            extract_session_cookie(&headers),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn test_extract_session_cookie_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("other=1"));
        assert_eq!(extract_session_cookie(&headers), None);
        assert_eq!(extract_session_cookie(&HeaderMap::new()), None);
    }

    #[test]
    fn test_extract_session_cookie_empty_value() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("tessera_session="));
        assert_eq!(extract_session_cookie(&headers), None);
    }

    #[test]
    fn test_is_secure_request_requires_trust_and_header() {
        let mut headers = HeaderMap::new();

        // No header, no trust
        assert!(!is_secure_request(&headers, true));
        assert!(!is_secure_request(&headers, false));

        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert!(is_secure_request(&headers, true));
        // The client claim alone is never enough
        assert!(!is_secure_request(&headers, false));

        headers.insert("x-forwarded-proto", HeaderValue::from_static("http"));
        assert!(!is_secure_request(&headers, true));
    }

    #[test]
    fn test_is_secure_request_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-proto", HeaderValue::from_static("HTTPS"));
        assert!(is_secure_request(&headers, true));
    }
}

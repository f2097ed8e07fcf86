//! UserInfo endpoint handler.

use crate::error::OAuthError;
use crate::models::UserInfoResponse;
use crate::router::OAuthState;
use crate::services::UserInfoService;
use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};

/// Returns the user's claims, filtered by the scopes granted to the
/// presented access token.
#[utoipa::path(
    get,
    path = "/oauth/userinfo",
    responses(
        (status = 200, description = "User claims", body = UserInfoResponse),
        (status = 401, description = "Invalid or missing access token"),
        (status = 403, description = "Insufficient scope"),
    ),
    security(("bearerAuth" = [])),
    tag = "OAuth2"
)]
pub async fn userinfo_handler(
    State(state): State<OAuthState>,
    headers: HeaderMap,
) -> Result<Json<UserInfoResponse>, OAuthError> {
    let token = extract_bearer_token(&headers)?;

    let access = state.tokens.validate_access_token(&token).await?;

    // openid is the gate for userinfo itself
    if !access.scopes.iter().any(|s| s == "openid") {
        return Err(OAuthError::InsufficientScope(
            "The access token must have openid scope for userinfo".to_string(),
        ));
    }

    Ok(Json(UserInfoService::claims_for(
        &access.user,
        &access.scopes,
    )))
}

/// Extract a Bearer token from the Authorization header.
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, OAuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| OAuthError::InvalidToken("Missing Authorization header".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| OAuthError::InvalidToken("Invalid Authorization header".to_string()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .map(String::from)
        .ok_or_else(|| {
            OAuthError::InvalidToken("Authorization header must use Bearer scheme".to_string())
        })?;

    if token.is_empty() {
        return Err(OAuthError::InvalidToken(
            "Bearer token cannot be empty".to_string(),
        ));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token_success() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer token-abc-123"),
        );

        assert_eq!(extract_bearer_token(&headers).unwrap(), "token-abc-123");
    }

    #[test]
    fn test_extract_bearer_token_missing_header() {
        assert!(extract_bearer_token(&HeaderMap::new()).is_err());
    }

    #[test]
    fn test_extract_bearer_token_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dGVzdDp0ZXN0"),
        );
        assert!(extract_bearer_token(&headers).is_err());
    }

    #[test]
    fn test_extract_bearer_token_empty() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(extract_bearer_token(&headers).is_err());
    }
}

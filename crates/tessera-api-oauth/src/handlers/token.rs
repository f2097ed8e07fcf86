//! Token endpoint handler.

use crate::error::OAuthError;
use crate::handlers::client_auth::extract_client_credentials;
use crate::models::{TokenRequest, TokenResponse};
use crate::router::OAuthState;
use axum::{extract::State, http::HeaderMap, Form, Json};
use tessera_db::models::Application;

/// OAuth2 token endpoint: authorization-code exchange and refresh
/// rotation.
#[utoipa::path(
    post,
    path = "/oauth/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Tokens issued", body = TokenResponse),
        (status = 400, description = "Invalid grant or request"),
        (status = 401, description = "Invalid client credentials"),
    ),
    tag = "OAuth2"
)]
pub async fn token_handler(
    State(state): State<OAuthState>,
    headers: HeaderMap,
    Form(request): Form<TokenRequest>,
) -> Result<Json<TokenResponse>, OAuthError> {
    let (client_id, client_secret) = extract_client_credentials(
        &headers,
        request.client_id.as_deref(),
        request.client_secret.as_deref(),
    )?;

    match request.grant_type.as_str() {
        "authorization_code" => {
            handle_authorization_code_grant(&state, &request, &client_id, client_secret.as_deref())
                .await
        }
        "refresh_token" => {
            handle_refresh_token_grant(&state, &request, &client_id, client_secret.as_deref())
                .await
        }
        _ => Err(OAuthError::UnsupportedGrantType(request.grant_type)),
    }
}

/// Authenticate the requesting client.
///
/// Confidential clients present their secret; public (PKCE) clients may
/// omit it, in which case possession of the PKCE verifier stands in -
/// enforced downstream against the challenge recorded with the grant.
async fn authenticate_client(
    state: &OAuthState,
    client_id: &str,
    client_secret: Option<&str>,
) -> Result<Application, OAuthError> {
    match client_secret {
        Some(secret) => {
            state
                .applications
                .verify_client_credentials(client_id, secret)
                .await
        }
        None => state
            .applications
            .get_active_by_client_id(client_id)
            .await
            .map_err(|_| OAuthError::InvalidClient("Invalid client credentials".to_string())),
    }
}

/// Handle the `authorization_code` grant.
async fn handle_authorization_code_grant(
    state: &OAuthState,
    request: &TokenRequest,
    client_id: &str,
    client_secret: Option<&str>,
) -> Result<Json<TokenResponse>, OAuthError> {
    let code = request
        .code
        .as_deref()
        .ok_or_else(|| OAuthError::InvalidRequest("code is required".to_string()))?;

    let redirect_uri = request
        .redirect_uri
        .as_deref()
        .ok_or_else(|| OAuthError::InvalidRequest("redirect_uri is required".to_string()))?;

    let application = authenticate_client(state, client_id, client_secret).await?;

    let record = state
        .codes
        .redeem(
            code,
            &application,
            redirect_uri,
            request.code_verifier.as_deref(),
        )
        .await
        .map_err(crate::services::CodeError::into_oauth_error)?;

    // A secretless exchange is only acceptable when the grant was bound to
    // a PKCE challenge at authorization time. The code is already consumed
    // at this point; failing closed here is the safe direction.
    if client_secret.is_none() && record.code_challenge.is_none() {
        tracing::warn!(
            client_id = %client_id,
            "Secretless code exchange without a PKCE-bound grant"
        );
        return Err(OAuthError::InvalidClient(
            "client_secret is required".to_string(),
        ));
    }

    let response = state.tokens.issue_for_code(&record).await?;

    tracing::info!(
        user_id = %record.user_id,
        client_id = %client_id,
        "Token pair issued from authorization code"
    );

    Ok(Json(response))
}

/// Handle the `refresh_token` grant (rotation).
async fn handle_refresh_token_grant(
    state: &OAuthState,
    request: &TokenRequest,
    client_id: &str,
    client_secret: Option<&str>,
) -> Result<Json<TokenResponse>, OAuthError> {
    let refresh_token = request
        .refresh_token
        .as_deref()
        .ok_or_else(|| OAuthError::InvalidRequest("refresh_token is required".to_string()))?;

    let application = authenticate_client(state, client_id, client_secret).await?;

    let response = state
        .tokens
        .issue_from_refresh(&application, refresh_token)
        .await?;

    tracing::info!(client_id = %client_id, "Token pair rotated from refresh token");

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_grant_type_error_code() {
        let err = OAuthError::UnsupportedGrantType("password".to_string());
        assert_eq!(
            err.error_code(),
            crate::error::OAuthErrorCode::UnsupportedGrantType
        );
    }

    #[test]
    fn test_token_request_missing_code_is_invalid_request() {
        // The handler turns an absent `code` into invalid_request before
        // touching any service.
        let request = TokenRequest {
            grant_type: "authorization_code".to_string(),
            code: None,
            redirect_uri: Some("https://crm.corp/cb".to_string()),
            client_id: Some("tsr_x".to_string()),
            client_secret: Some("secret".to_string()),
            code_verifier: None,
            refresh_token: None,
        };
        assert!(request.code.is_none());
    }
}

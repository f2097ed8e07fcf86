//! RFC 7009 token revocation handler.
//!
//! `POST /oauth/revoke` - revokes an access or refresh token.
//!
//! Per RFC 7009 the endpoint returns 200 OK even when the token was not
//! found or was already revoked: anything else would let callers probe
//! which token strings exist. Client authentication failures are still
//! 401 - the anti-enumeration property protects tokens, not clients.

use crate::error::OAuthError;
use crate::handlers::client_auth::extract_client_credentials;
use crate::models::RevocationRequest;
use crate::router::OAuthState;
use axum::{extract::State, http::HeaderMap, Form, Json};
use serde_json::{json, Value};

/// Revoke an access or refresh token (RFC 7009).
#[utoipa::path(
    post,
    path = "/oauth/revoke",
    responses(
        (status = 200, description = "Always returned once the client is authenticated, token known or not"),
        (status = 401, description = "Invalid client credentials"),
    ),
    tag = "OAuth2"
)]
pub async fn revoke_token_handler(
    State(state): State<OAuthState>,
    headers: HeaderMap,
    Form(request): Form<RevocationRequest>,
) -> Result<Json<Value>, OAuthError> {
    let (client_id, client_secret) = extract_client_credentials(
        &headers,
        request.client_id.as_deref(),
        request.client_secret.as_deref(),
    )?;

    let client_secret = client_secret.ok_or_else(|| {
        OAuthError::InvalidClient("client_secret is required for revocation".to_string())
    })?;

    let application = state
        .applications
        .verify_client_credentials(&client_id, &client_secret)
        .await?;

    state
        .tokens
        .revoke(
            &application,
            &request.token,
            request.token_type_hint.as_deref(),
        )
        .await?;

    // RFC 7009 Section 2.2: empty 200 response, token found or not
    Ok(Json(json!({})))
}

//! OIDC discovery handler.

use crate::models::OidcDiscovery;
use crate::router::OAuthState;
use axum::{extract::State, Json};

/// OpenID Connect discovery document.
#[utoipa::path(
    get,
    path = "/.well-known/openid-configuration",
    responses((status = 200, description = "OIDC discovery metadata", body = OidcDiscovery)),
    tag = "OAuth2"
)]
pub async fn discovery_handler(State(state): State<OAuthState>) -> Json<OidcDiscovery> {
    Json(OidcDiscovery::for_issuer(&state.issuer))
}

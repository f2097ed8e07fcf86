//! Portal application listing.

use crate::error::OAuthError;
use crate::models::ApplicationListItem;
use crate::router::OAuthState;
use axum::{extract::State, http::HeaderMap, Json};
use tessera_api_sso::session::current_user;

/// List the active applications visible to the current user, in portal
/// order. Public applications appear for everyone; the rest require a
/// direct, group, or department grant.
#[utoipa::path(
    get,
    path = "/api/applications",
    responses(
        (status = 200, description = "Visible applications", body = [ApplicationListItem]),
        (status = 401, description = "Not authenticated"),
    ),
    tag = "Portal"
)]
pub async fn list_applications_handler(
    State(state): State<OAuthState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ApplicationListItem>>, OAuthError> {
    let user = current_user(&state.pool, &headers, &state.session)
        .await?
        .ok_or_else(|| OAuthError::InvalidToken("Not authenticated".to_string()))?;

    let applications = state.access.list_visible_applications(&user).await?;

    Ok(Json(
        applications
            .into_iter()
            .map(ApplicationListItem::from)
            .collect(),
    ))
}

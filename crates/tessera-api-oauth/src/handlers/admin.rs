//! Administrative operations at the collaborator boundary.
//!
//! The admin UI itself lives elsewhere; these handlers expose the core
//! operations it calls: application registration, secret regeneration, the
//! two delete semantics, access grants/revocations, token listing, and the
//! expired-artifact purge. All routes require an admin session.

use crate::error::OAuthError;
use crate::models::{
    AccessChangeResponse, AccessGrantRequest, AccessRevokeRequest, ApplicationResponse,
    ApplicationWithSecret, CreateApplicationRequest, TokenListItem,
};
use crate::router::OAuthState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use tessera_api_sso::session::current_user;
use tessera_db::models::{AccessGrant, Application, User};
use uuid::Uuid;

/// Resolve the current session and require an administrative role.
async fn require_admin(state: &OAuthState, headers: &HeaderMap) -> Result<User, OAuthError> {
    let user = current_user(&state.pool, headers, &state.session)
        .await?
        .ok_or_else(|| OAuthError::InvalidToken("Not authenticated".to_string()))?;

    if !user.has_admin_role() {
        return Err(OAuthError::AccessDenied(
            "Administrator role required".to_string(),
        ));
    }

    Ok(user)
}

/// Register a new application.
///
/// The response carries the plaintext client secret - the only time it is
/// ever visible.
pub async fn admin_create_application_handler(
    State(state): State<OAuthState>,
    headers: HeaderMap,
    Json(request): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationWithSecret>), OAuthError> {
    let admin = require_admin(&state, &headers).await?;

    let (application, client_secret) = state.applications.create_application(request).await?;

    tracing::info!(
        admin_id = %admin.id,
        application_id = %application.id,
        "Application created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApplicationWithSecret {
            application: ApplicationResponse::from(application),
            client_secret,
        }),
    ))
}

/// Regenerate an application's client secret. The previous secret is
/// invalidated immediately.
pub async fn admin_regenerate_secret_handler(
    State(state): State<OAuthState>,
    headers: HeaderMap,
    Path(application_id): Path<Uuid>,
) -> Result<Json<ApplicationWithSecret>, OAuthError> {
    let admin = require_admin(&state, &headers).await?;

    let (application, client_secret) =
        state.applications.regenerate_secret(application_id).await?;

    tracing::info!(
        admin_id = %admin.id,
        application_id = %application_id,
        "Client secret regenerated"
    );

    Ok(Json(ApplicationWithSecret {
        application: ApplicationResponse::from(application),
        client_secret,
    }))
}

/// Query parameters for application deletion.
#[derive(Debug, Deserialize)]
pub struct DeleteApplicationQuery {
    /// When true, permanently delete (terminal); otherwise deactivate
    /// (reversible).
    #[serde(default)]
    pub permanent: bool,
}

/// Delete an application: the administrator chooses between the
/// reversible deactivation and the permanent purge.
pub async fn admin_delete_application_handler(
    State(state): State<OAuthState>,
    headers: HeaderMap,
    Path(application_id): Path<Uuid>,
    Query(query): Query<DeleteApplicationQuery>,
) -> Result<StatusCode, OAuthError> {
    let admin = require_admin(&state, &headers).await?;

    if query.permanent {
        state.applications.purge(application_id).await?;
    } else {
        state.applications.deactivate(application_id).await?;
    }

    tracing::info!(
        admin_id = %admin.id,
        application_id = %application_id,
        permanent = query.permanent,
        "Application deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Grant application access to users and/or groups.
pub async fn admin_grant_access_handler(
    State(state): State<OAuthState>,
    headers: HeaderMap,
    Json(request): Json<AccessGrantRequest>,
) -> Result<Json<AccessChangeResponse>, OAuthError> {
    let admin = require_admin(&state, &headers).await?;

    // The application must exist and not be deleted
    let application = Application::find_by_id(&state.pool, request.application_id)
        .await?
        .ok_or(OAuthError::ApplicationNotFound)?;

    let mut changed = 0;
    for user_id in &request.user_ids {
        AccessGrant::grant_to_user(&state.pool, application.id, *user_id, Some(admin.id)).await?;
        changed += 1;
    }
    for group_id in &request.group_ids {
        AccessGrant::grant_to_group(&state.pool, application.id, *group_id, Some(admin.id))
            .await?;
        changed += 1;
    }

    tracing::info!(
        admin_id = %admin.id,
        application_id = %application.id,
        granted = changed,
        "Access granted"
    );

    Ok(Json(AccessChangeResponse { changed }))
}

/// Revoke application access from users and/or groups.
pub async fn admin_revoke_access_handler(
    State(state): State<OAuthState>,
    headers: HeaderMap,
    Json(request): Json<AccessRevokeRequest>,
) -> Result<Json<AccessChangeResponse>, OAuthError> {
    let admin = require_admin(&state, &headers).await?;

    let mut changed = 0;
    for user_id in &request.user_ids {
        if AccessGrant::revoke_for_user(&state.pool, request.application_id, *user_id).await? {
            changed += 1;
        }
    }
    for group_id in &request.group_ids {
        if AccessGrant::revoke_for_group(&state.pool, request.application_id, *group_id).await? {
            changed += 1;
        }
    }

    tracing::info!(
        admin_id = %admin.id,
        application_id = %request.application_id,
        revoked = changed,
        "Access revoked"
    );

    Ok(Json(AccessChangeResponse { changed }))
}

/// List token pairs issued for an application.
pub async fn admin_list_tokens_handler(
    State(state): State<OAuthState>,
    headers: HeaderMap,
    Path(application_id): Path<Uuid>,
) -> Result<Json<Vec<TokenListItem>>, OAuthError> {
    require_admin(&state, &headers).await?;

    let tokens = state.tokens.list_for_application(application_id).await?;
    Ok(Json(tokens))
}

/// Response body for the purge operation.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct PurgeResponse {
    pub codes_deleted: u64,
    pub tokens_deleted: u64,
}

/// Garbage-collect expired authorization codes and lapsed token pairs.
pub async fn admin_purge_handler(
    State(state): State<OAuthState>,
    headers: HeaderMap,
) -> Result<Json<PurgeResponse>, OAuthError> {
    let admin = require_admin(&state, &headers).await?;

    let (codes_deleted, tokens_deleted) = state.tokens.purge_expired().await?;

    tracing::info!(
        admin_id = %admin.id,
        codes_deleted,
        tokens_deleted,
        "Expired codes and tokens purged"
    );

    Ok(Json(PurgeResponse {
        codes_deleted,
        tokens_deleted,
    }))
}

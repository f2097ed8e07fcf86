//! OAuth2 API router configuration.
//!
//! Routers:
//! - [`oauth_router`] - `/oauth/{authorize,token,userinfo,revoke}`
//! - [`well_known_router`] - `/.well-known/openid-configuration`
//! - [`api_router`] - the portal listing and admin boundary under `/api`

use crate::handlers::{
    admin_create_application_handler, admin_delete_application_handler,
    admin_grant_access_handler, admin_list_tokens_handler, admin_purge_handler,
    admin_regenerate_secret_handler, admin_revoke_access_handler, authorize_handler,
    discovery_handler, list_applications_handler, revoke_token_handler, token_handler,
    userinfo_handler,
};
use crate::services::{
    AccessService, ApplicationService, AuthorizationService, TokenService,
};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tessera_api_sso::SessionConfig;
use tessera_db::DbPool;

/// Application state for OAuth2 routes.
#[derive(Clone)]
pub struct OAuthState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Application (client) service.
    pub applications: Arc<ApplicationService>,
    /// Authorization code store.
    pub codes: Arc<AuthorizationService>,
    /// Token service.
    pub tokens: Arc<TokenService>,
    /// Access decision engine.
    pub access: Arc<AccessService>,
    /// Issuer base URL (e.g. "https://id.corp.example").
    pub issuer: String,
    /// Session validation configuration, shared with the SSO crate.
    pub session: Arc<SessionConfig>,
}

impl OAuthState {
    /// Create the OAuth state with the default refresh-token lifetime.
    #[must_use]
    pub fn new(pool: DbPool, issuer: String, session: Arc<SessionConfig>) -> Self {
        Self::with_refresh_ttl_days(pool, issuer, session, crate::services::token::DEFAULT_REFRESH_TTL_DAYS)
    }

    /// Create the OAuth state with a configured maximum refresh lifetime.
    #[must_use]
    pub fn with_refresh_ttl_days(
        pool: DbPool,
        issuer: String,
        session: Arc<SessionConfig>,
        refresh_ttl_days: i64,
    ) -> Self {
        Self {
            applications: Arc::new(ApplicationService::new(pool.clone())),
            codes: Arc::new(AuthorizationService::new(pool.clone())),
            tokens: Arc::new(TokenService::with_refresh_ttl_days(
                pool.clone(),
                refresh_ttl_days,
            )),
            access: Arc::new(AccessService::new(pool.clone())),
            pool,
            issuer,
            session,
        }
    }
}

/// Create the `/oauth` router.
pub fn oauth_router(state: OAuthState) -> Router {
    Router::new()
        .route("/authorize", get(authorize_handler))
        .route("/token", post(token_handler))
        .route("/userinfo", get(userinfo_handler))
        .route("/revoke", post(revoke_token_handler))
        .with_state(state)
}

/// Create the `/.well-known` router.
pub fn well_known_router(state: OAuthState) -> Router {
    Router::new()
        .route("/openid-configuration", get(discovery_handler))
        .with_state(state)
}

/// Create the `/api` router: portal listing plus the admin collaborator
/// boundary. Admin routes enforce the admin role per handler.
pub fn api_router(state: OAuthState) -> Router {
    Router::new()
        .route("/applications", get(list_applications_handler))
        .route("/admin/applications", post(admin_create_application_handler))
        .route(
            "/admin/applications/:id",
            delete(admin_delete_application_handler),
        )
        .route(
            "/admin/applications/:id/regenerate-secret",
            post(admin_regenerate_secret_handler),
        )
        .route(
            "/admin/applications/:id/tokens",
            get(admin_list_tokens_handler),
        )
        .route("/admin/access/grant", post(admin_grant_access_handler))
        .route("/admin/access/revoke", post(admin_revoke_access_handler))
        .route("/admin/purge", post(admin_purge_handler))
        .with_state(state)
}

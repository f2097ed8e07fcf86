//! SSO/session router configuration.
//!
//! Routes mounted at `/auth`:
//! - `GET /sso/login` - redirect to the identity provider
//! - `GET /sso/callback` - provider callback, sets the session cookie
//! - `GET /logout` - clear the session cookie
//! - `GET /me` - current user profile
//! - `GET /check` - authentication probe

use crate::handlers::{
    auth_check_handler, auth_me_handler, logout_handler, sso_callback_handler, sso_login_handler,
};
use crate::services::FederationService;
use axum::{routing::get, Router};
use std::sync::Arc;
use tessera_db::DbPool;

/// Configuration for the upstream corporate identity provider.
#[derive(Debug, Clone)]
pub struct FederationConfig {
    /// Provider issuer URL (discovery root).
    pub issuer_url: String,
    /// Our client id at the provider.
    pub client_id: String,
    /// Our client secret at the provider.
    pub client_secret: String,
    /// Absolute URL of our `/auth/sso/callback` endpoint.
    pub callback_url: String,
    /// Space-separated scopes requested from the provider.
    pub scopes: String,
}

/// Configuration for browser session issuance.
#[derive(Clone)]
pub struct SessionConfig {
    /// RS256 private key (PEM) used to sign session tokens.
    pub private_key: Vec<u8>,
    /// RS256 public key (PEM) used to validate session tokens.
    pub public_key: Vec<u8>,
    /// Issuer embedded in session tokens.
    pub issuer: String,
    /// Session lifetime in seconds (cookie `Max-Age` matches).
    pub ttl_secs: i64,
    /// Whether to honor `X-Forwarded-Proto` from the reverse proxy when
    /// deciding the cookie's `Secure` attribute.
    pub trust_forwarded_proto: bool,
    /// Whether development-only affordances are permitted at runtime.
    pub development_mode: bool,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("issuer", &self.issuer)
            .field("ttl_secs", &self.ttl_secs)
            .field("trust_forwarded_proto", &self.trust_forwarded_proto)
            .field("development_mode", &self.development_mode)
            .finish_non_exhaustive()
    }
}

/// Application state for SSO/session routes.
#[derive(Clone)]
pub struct SsoState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Federation service for the corporate identity provider.
    pub federation: Arc<FederationService>,
    /// Session issuance configuration.
    pub session: Arc<SessionConfig>,
}

impl SsoState {
    /// Create a new SSO state.
    #[must_use]
    pub fn new(pool: DbPool, federation: FederationConfig, session: SessionConfig) -> Self {
        let federation = Arc::new(FederationService::new(pool.clone(), federation));
        Self {
            pool,
            federation,
            session: Arc::new(session),
        }
    }
}

/// Create the `/auth` router.
pub fn auth_router(state: SsoState) -> Router {
    let router = Router::new()
        .route("/sso/login", get(sso_login_handler))
        .route("/sso/callback", get(sso_callback_handler))
        .route("/logout", get(logout_handler))
        .route("/me", get(auth_me_handler))
        .route("/check", get(auth_check_handler));

    // Development-only login bypass. Compiled out of production builds; the
    // handler additionally refuses to run outside development mode.
    #[cfg(feature = "dev-login")]
    let router = router.route("/dev/login", axum::routing::post(crate::handlers::dev_login_handler));

    router.with_state(state)
}

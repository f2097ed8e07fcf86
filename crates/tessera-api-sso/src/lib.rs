//! Corporate SSO federation and browser session API for tessera.
//!
//! This crate implements the federation half of single sign-on against the
//! external corporate OpenID Connect provider, and the browser session
//! credential derived from it.
//!
//! # Endpoints (mounted at /auth)
//!
//! - `GET /auth/sso/login` - Redirect to the identity provider
//! - `GET /auth/sso/callback` - Provider callback; sets the session cookie
//! - `GET /auth/logout` - Clear the session cookie
//! - `GET /auth/me` - Current user profile
//! - `GET /auth/check` - Lightweight authentication probe
//!
//! With the `dev-login` cargo feature (development builds only), an extra
//! `POST /auth/dev/login` accepts a role selector instead of real
//! federation; the route does not exist in production builds and is
//! additionally refused at runtime outside development mode.
//!
//! # Example
//!
//! ```rust,ignore
//! use tessera_api_sso::{auth_router, SsoState};
//! use axum::Router;
//!
//! let state = SsoState::new(pool, federation_config, session_config);
//! let app = Router::new().nest("/auth", auth_router(state));
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod session;

pub use error::{FederationError, SessionError};
pub use models::IdentityClaims;
pub use router::{auth_router, FederationConfig, SessionConfig, SsoState};
pub use services::federation::FederationService;
pub use session::{
    clear_session_cookie, create_session_cookie, current_user, extract_session_cookie,
    is_secure_request, issue_session, SESSION_COOKIE_NAME,
};

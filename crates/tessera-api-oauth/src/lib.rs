//! OAuth2 Authorization Server API for tessera.
//!
//! This crate implements the OAuth2 Authorization Code grant (with
//! optional PKCE), refresh-token rotation, RFC 7009 revocation, the
//! UserInfo endpoint, OIDC discovery metadata, and the access-control
//! decision procedure gating which users may use which applications.
//!
//! # Endpoints
//!
//! ## OAuth2 endpoints (mounted at /oauth)
//!
//! - `GET /oauth/authorize` - Authorization endpoint (code flow only)
//! - `POST /oauth/token` - Token endpoint (`authorization_code`, `refresh_token`)
//! - `GET /oauth/userinfo` - UserInfo endpoint
//! - `POST /oauth/revoke` - RFC 7009 token revocation
//!
//! ## Well-known endpoints (mounted at /.well-known)
//!
//! - `GET /.well-known/openid-configuration` - OIDC discovery
//!
//! ## Portal/admin boundary (mounted at /api)
//!
//! - `GET /api/applications` - applications visible to the current user
//! - `POST /api/admin/applications`, secret regeneration, delete,
//!   grant/revoke access, token listing, purge
//!
//! # Example
//!
//! ```rust,ignore
//! use tessera_api_oauth::{api_router, oauth_router, well_known_router, OAuthState};
//! use axum::Router;
//!
//! let state = OAuthState::new(pool, issuer, session_config);
//! let app = Router::new()
//!     .nest("/oauth", oauth_router(state.clone()))
//!     .nest("/.well-known", well_known_router(state.clone()))
//!     .nest("/api", api_router(state));
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::{OAuthError, OAuthErrorCode, OAuthErrorResponse};
pub use router::{api_router, oauth_router, well_known_router, OAuthState};

//! tessera Database Library
//!
//! PostgreSQL persistence for tessera: entity models with their queries,
//! embedded migrations, and the shared error type.
//!
//! Single-use and revocation transitions (login-session consumption, code
//! redemption, token rotation) are expressed as single-statement conditional
//! UPDATEs so they stay correct when the service runs as multiple stateless
//! instances behind a load balancer.

pub mod error;
pub mod migrations;
pub mod models;

pub use error::DbError;
pub use migrations::run_migrations;
pub use models::{
    AccessGrant, Application, ApplicationStatus, AuthorizationCode, CreateApplication,
    NewAuthorizationCode, NewOAuthToken, OAuthToken, SsoLoginSession, UpsertUserFromSso, User,
    UserGroup,
};

/// Convenience alias for the connection pool type used throughout tessera.
pub type DbPool = sqlx::PgPool;

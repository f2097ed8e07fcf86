//! SSO login session model.
//!
//! Temporary server-side state for one federation round-trip: the CSRF
//! `state`, the OIDC `nonce`, the PKCE verifier and the post-login return
//! path. Consumed atomically by `state` when the provider calls back, so a
//! replayed or forged callback cannot reuse it.

use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Login session expiry in minutes.
pub const LOGIN_SESSION_EXPIRY_MINUTES: i64 = 10;

/// One in-flight federation round-trip.
#[derive(Debug, Clone, FromRow)]
pub struct SsoLoginSession {
    pub id: Uuid,
    /// Opaque CSRF state echoed by the identity provider.
    pub state: String,
    /// OIDC nonce expected inside the ID token.
    pub nonce: String,
    /// PKCE verifier. Stored as plain text; the row lives 10 minutes.
    pub pkce_verifier: String,
    /// Local path to return the browser to after login.
    pub return_to: String,
    pub used: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SsoLoginSession {
    /// Whether the session is expired at the given instant.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Create a new login session.
    pub async fn create(
        pool: &sqlx::PgPool,
        state: &str,
        nonce: &str,
        pkce_verifier: &str,
        return_to: &str,
    ) -> Result<Self, sqlx::Error> {
        let expires_at = Utc::now() + Duration::minutes(LOGIN_SESSION_EXPIRY_MINUTES);

        sqlx::query_as(
            r"
            INSERT INTO sso_login_sessions (state, nonce, pkce_verifier, return_to, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            ",
        )
        .bind(state)
        .bind(nonce)
        .bind(pkce_verifier)
        .bind(return_to)
        .bind(expires_at)
        .fetch_one(pool)
        .await
    }

    /// Atomically consume the session matching `state`.
    ///
    /// Flips `used` in the same statement that selects the row, so a
    /// replayed callback (or a TOCTOU race between two callbacks) finds
    /// nothing. Expired sessions are never returned.
    pub async fn consume_by_state(
        pool: &sqlx::PgPool,
        state: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            UPDATE sso_login_sessions
            SET used = TRUE
            WHERE state = $1 AND used = FALSE AND expires_at > NOW()
            RETURNING *
            ",
        )
        .bind(state)
        .fetch_optional(pool)
        .await
    }

    /// Garbage-collect expired sessions.
    pub async fn cleanup_expired(pool: &sqlx::PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sso_login_sessions WHERE expires_at < NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_is_pure_in_now() {
        let now = Utc::now();
        let session = SsoLoginSession {
            id: Uuid::new_v4(),
            state: "s".repeat(43),
            nonce: "n".repeat(43),
            pkce_verifier: "v".repeat(43),
            return_to: "/".to_string(),
            used: false,
            expires_at: now + Duration::minutes(10),
            created_at: now,
        };

        assert!(!session.is_expired_at(now));
        assert!(session.is_expired_at(now + Duration::minutes(10)));
        assert!(session.is_expired_at(now + Duration::minutes(11)));
    }
}

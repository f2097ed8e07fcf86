//! OAuth token pair model.
//!
//! An access/refresh pair issued from a code exchange or refresh rotation.
//! Token strings are stored only as SHA-256 hashes. A pair is valid while
//! `revoked_at IS NULL AND now < expires_at`; both the expired and the
//! revoked states are terminal. Rotation and revocation are
//! single-statement conditional UPDATEs.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted access/refresh token pair (hash-at-rest).
#[derive(Debug, Clone, FromRow)]
pub struct OAuthToken {
    pub id: Uuid,
    /// SHA-256 hex of the access token.
    pub access_token_hash: String,
    /// SHA-256 hex of the refresh token.
    pub refresh_token_hash: String,
    pub user_id: Uuid,
    pub application_id: Uuid,
    pub scopes: Vec<String>,
    /// Access-token expiry (issuance + 1 hour).
    pub expires_at: DateTime<Utc>,
    /// Set on explicit revocation or refresh rotation. Terminal.
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Input for persisting a freshly minted pair.
#[derive(Debug, Clone)]
pub struct NewOAuthToken {
    pub access_token_hash: String,
    pub refresh_token_hash: String,
    pub user_id: Uuid,
    pub application_id: Uuid,
    pub scopes: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

impl OAuthToken {
    /// Whether the access token is usable at the given instant. Pure in
    /// `(self, now)` so tests can inject time.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && now < self.expires_at
    }

    /// Whether the refresh token may still rotate at the given instant,
    /// under a maximum refresh lifetime measured from issuance.
    #[must_use]
    pub fn refresh_usable_at(&self, now: DateTime<Utc>, max_lifetime: chrono::Duration) -> bool {
        self.revoked_at.is_none() && now < self.created_at + max_lifetime
    }

    /// Persist a new pair.
    pub async fn insert(pool: &sqlx::PgPool, input: NewOAuthToken) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            INSERT INTO oauth_tokens (
                access_token_hash, refresh_token_hash, user_id,
                application_id, scopes, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            ",
        )
        .bind(&input.access_token_hash)
        .bind(&input.refresh_token_hash)
        .bind(input.user_id)
        .bind(input.application_id)
        .bind(&input.scopes)
        .bind(input.expires_at)
        .fetch_one(pool)
        .await
    }

    /// Look up a pair by access-token hash.
    pub async fn find_by_access_hash(
        pool: &sqlx::PgPool,
        access_token_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM oauth_tokens WHERE access_token_hash = $1")
            .bind(access_token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Atomically revoke a pair by refresh-token hash, scoped to the
    /// requesting application, and return it.
    ///
    /// This is the rotation serialization point: exactly one concurrent
    /// caller flips `revoked_at` and receives the row; a replayed refresh
    /// token finds the row already revoked and gets `None`. Scoping by
    /// `application_id` keeps one client from consuming another client's
    /// token.
    pub async fn revoke_by_refresh_hash(
        pool: &sqlx::PgPool,
        application_id: Uuid,
        refresh_token_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            UPDATE oauth_tokens
            SET revoked_at = NOW()
            WHERE refresh_token_hash = $1
              AND application_id = $2
              AND revoked_at IS NULL
            RETURNING *
            ",
        )
        .bind(refresh_token_hash)
        .bind(application_id)
        .fetch_optional(pool)
        .await
    }

    /// Revoke every live pair issued to an application. Used when an
    /// application is deactivated or its secret is regenerated.
    pub async fn revoke_all_for_application(
        pool: &sqlx::PgPool,
        application_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r"
            UPDATE oauth_tokens
            SET revoked_at = NOW()
            WHERE application_id = $1 AND revoked_at IS NULL
            ",
        )
        .bind(application_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Revoke the pair matching either token hash, scoped to an
    /// application. Returns the number of rows revoked; RFC 7009 callers
    /// ignore it.
    pub async fn revoke_matching_hash(
        pool: &sqlx::PgPool,
        application_id: Uuid,
        token_hash: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r"
            UPDATE oauth_tokens
            SET revoked_at = NOW()
            WHERE application_id = $1
              AND (access_token_hash = $2 OR refresh_token_hash = $2)
              AND revoked_at IS NULL
            ",
        )
        .bind(application_id)
        .bind(token_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// List pairs issued for an application, newest first.
    pub async fn list_for_application(
        pool: &sqlx::PgPool,
        application_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM oauth_tokens
            WHERE application_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(application_id)
        .fetch_all(pool)
        .await
    }

    /// Garbage-collect pairs whose refresh lifetime has fully lapsed.
    ///
    /// Rows are kept for the refresh window after access expiry so the
    /// refresh grant keeps working; `retention` should therefore be at
    /// least the configured maximum refresh lifetime.
    pub async fn cleanup_expired(
        pool: &sqlx::PgPool,
        retention: chrono::Duration,
    ) -> Result<u64, sqlx::Error> {
        let cutoff = Utc::now() - retention;
        let result = sqlx::query("DELETE FROM oauth_tokens WHERE created_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_token(created_at: DateTime<Utc>, revoked_at: Option<DateTime<Utc>>) -> OAuthToken {
        OAuthToken {
            id: Uuid::new_v4(),
            access_token_hash: "aa".repeat(32),
            refresh_token_hash: "bb".repeat(32),
            user_id: Uuid::new_v4(),
            application_id: Uuid::new_v4(),
            scopes: vec!["openid".to_string(), "profile".to_string()],
            expires_at: created_at + Duration::hours(1),
            revoked_at,
            created_at,
        }
    }

    #[test]
    fn test_validity_is_pure_in_now() {
        let issued = Utc::now();
        let token = sample_token(issued, None);

        assert!(token.is_valid_at(issued));
        assert!(token.is_valid_at(issued + Duration::minutes(59)));
        // Access expiry is exactly one hour
        assert!(!token.is_valid_at(issued + Duration::hours(1)));
        assert!(!token.is_valid_at(issued + Duration::hours(2)));
    }

    #[test]
    fn test_revoked_is_terminal_regardless_of_expiry() {
        let issued = Utc::now();
        let token = sample_token(issued, Some(issued + Duration::minutes(5)));

        // Still within the 1h access window but revoked
        assert!(!token.is_valid_at(issued + Duration::minutes(10)));
    }

    #[test]
    fn test_refresh_lifetime_policy() {
        let issued = Utc::now();
        let token = sample_token(issued, None);
        let max = Duration::days(30);

        assert!(token.refresh_usable_at(issued + Duration::days(29), max));
        assert!(!token.refresh_usable_at(issued + Duration::days(30), max));

        let revoked = sample_token(issued, Some(issued));
        assert!(!revoked.refresh_usable_at(issued + Duration::days(1), max));
    }
}

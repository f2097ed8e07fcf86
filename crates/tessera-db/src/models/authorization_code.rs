//! Authorization code model.
//!
//! Single-use, short-lived artifact binding a user, a client application, a
//! redirect target and the requested scopes. Only the SHA-256 hash of the
//! code is stored. The `used` flag transitions false→true exactly once via
//! [`AuthorizationCode::consume_by_hash`], a single-statement conditional
//! UPDATE — the serialization point for concurrent redemption attempts.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted authorization code (hash-at-rest).
#[derive(Debug, Clone, FromRow)]
pub struct AuthorizationCode {
    pub id: Uuid,
    /// SHA-256 hex of the plaintext code.
    pub code_hash: String,
    pub user_id: Uuid,
    pub application_id: Uuid,
    /// The exact redirect URI the code was issued for.
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    /// Client's `state` passthrough value.
    pub state: Option<String>,
    /// PKCE challenge, when the client supplied one.
    pub code_challenge: Option<String>,
    /// PKCE challenge method ("S256" or "plain").
    pub code_challenge_method: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for persisting a freshly issued code.
#[derive(Debug, Clone)]
pub struct NewAuthorizationCode {
    pub code_hash: String,
    pub user_id: Uuid,
    pub application_id: Uuid,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub state: Option<String>,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl AuthorizationCode {
    /// Whether the code is expired at the given instant. Pure in
    /// `(self, now)` so tests can inject time.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Persist a new code.
    pub async fn insert(
        pool: &sqlx::PgPool,
        input: NewAuthorizationCode,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            INSERT INTO authorization_codes (
                code_hash, user_id, application_id, redirect_uri,
                scopes, state, code_challenge, code_challenge_method, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            ",
        )
        .bind(&input.code_hash)
        .bind(input.user_id)
        .bind(input.application_id)
        .bind(&input.redirect_uri)
        .bind(&input.scopes)
        .bind(&input.state)
        .bind(&input.code_challenge)
        .bind(&input.code_challenge_method)
        .bind(input.expires_at)
        .fetch_one(pool)
        .await
    }

    /// Atomically consume a code: flip `used` from false to true and return
    /// the row, in one statement.
    ///
    /// Exactly one concurrent caller wins; everyone else gets `None`. The
    /// flip happens even when the code has already expired — the winner
    /// reports the expiry, and any retry then fails as already-used, which
    /// is the required single-transition behavior.
    pub async fn consume_by_hash(
        pool: &sqlx::PgPool,
        code_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            UPDATE authorization_codes
            SET used = TRUE
            WHERE code_hash = $1 AND used = FALSE
            RETURNING *
            ",
        )
        .bind(code_hash)
        .fetch_optional(pool)
        .await
    }

    /// Look up a code without consuming it. Used to classify a failed
    /// consume (unknown code vs. replay) for logging.
    pub async fn find_by_hash(
        pool: &sqlx::PgPool,
        code_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM authorization_codes WHERE code_hash = $1")
            .bind(code_hash)
            .fetch_optional(pool)
            .await
    }

    /// Garbage-collect codes past their expiry.
    pub async fn cleanup_expired(pool: &sqlx::PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM authorization_codes WHERE expires_at < NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_code(expires_at: DateTime<Utc>) -> AuthorizationCode {
        AuthorizationCode {
            id: Uuid::new_v4(),
            code_hash: "ab".repeat(32),
            user_id: Uuid::new_v4(),
            application_id: Uuid::new_v4(),
            redirect_uri: "https://crm.corp/cb".to_string(),
            scopes: vec!["openid".to_string()],
            state: Some("xyz".to_string()),
            code_challenge: None,
            code_challenge_method: None,
            expires_at,
            used: false,
            created_at: expires_at - Duration::minutes(10),
        }
    }

    #[test]
    fn test_expiry_is_pure_in_now() {
        let issued = Utc::now();
        let code = sample_code(issued + Duration::minutes(10));

        assert!(!code.is_expired_at(issued));
        assert!(!code.is_expired_at(issued + Duration::minutes(10) - Duration::seconds(1)));
        // 10 minutes + 1 second of skew: expired
        assert!(code.is_expired_at(issued + Duration::minutes(10) + Duration::seconds(1)));
        // Boundary: expiry instant itself counts as expired
        assert!(code.is_expired_at(issued + Duration::minutes(10)));
    }
}

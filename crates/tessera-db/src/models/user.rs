//! User entity model.
//!
//! A user is a federated identity: rows are created and refreshed by SSO
//! logins, keyed by the identity provider's immutable subject claim
//! (`sso_id`). Email is deliberately not an identity key — corporate email
//! addresses can be reassigned.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use tessera_core::UserId;
use uuid::Uuid;

/// A user account provisioned from the corporate identity provider.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    /// Unique identifier for the user.
    pub id: Uuid,

    /// Immutable subject claim from the identity provider (unique).
    pub sso_id: String,

    /// User's email address. Not assumed unique.
    pub email: String,

    /// Display name.
    pub display_name: String,

    /// Given name.
    pub first_name: Option<String>,

    /// Family name.
    pub last_name: Option<String>,

    /// Department from the directory.
    pub department: Option<String>,

    /// Job title from the directory.
    pub job_title: Option<String>,

    /// Group names reported by the identity provider.
    pub sso_groups: Vec<String>,

    /// Whether the account is active (false = soft-deleted).
    pub is_active: bool,

    /// Whether the user is an administrator.
    pub is_admin: bool,

    /// Whether the user is a super administrator.
    pub is_super_admin: bool,

    /// Timestamp of the most recent federated login.
    pub last_login_at: Option<DateTime<Utc>>,

    /// When the user was first provisioned.
    pub created_at: DateTime<Utc>,

    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Profile fields written on every federated login.
#[derive(Debug, Clone)]
pub struct UpsertUserFromSso {
    pub sso_id: String,
    pub email: String,
    pub display_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<String>,
    pub job_title: Option<String>,
    pub sso_groups: Vec<String>,
}

impl User {
    /// Get the user ID as a typed `UserId`.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::from_uuid(self.id)
    }

    /// Whether this user holds any administrative role.
    #[must_use]
    pub fn has_admin_role(&self) -> bool {
        self.is_admin || self.is_super_admin
    }

    /// Create-or-update a user from fresh identity-provider claims.
    ///
    /// Matches by `sso_id`; inserts when absent, otherwise overwrites the
    /// mutable profile fields. `last_login_at` is stamped in both cases.
    /// Admin flags and `is_active` are administrative state and are never
    /// touched by logins.
    pub async fn upsert_from_sso(
        pool: &sqlx::PgPool,
        input: UpsertUserFromSso,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            INSERT INTO users (
                sso_id, email, display_name, first_name, last_name,
                department, job_title, sso_groups, last_login_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            ON CONFLICT (sso_id) DO UPDATE SET
                email = EXCLUDED.email,
                display_name = EXCLUDED.display_name,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                department = EXCLUDED.department,
                job_title = EXCLUDED.job_title,
                sso_groups = EXCLUDED.sso_groups,
                last_login_at = NOW(),
                updated_at = NOW()
            RETURNING *
            ",
        )
        .bind(&input.sso_id)
        .bind(&input.email)
        .bind(&input.display_name)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.department)
        .bind(&input.job_title)
        .bind(&input.sso_groups)
        .fetch_one(pool)
        .await
    }

    /// Find a user by ID.
    pub async fn find_by_id(pool: &sqlx::PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by the identity provider's subject claim.
    pub async fn find_by_sso_id(
        pool: &sqlx::PgPool,
        sso_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE sso_id = $1")
            .bind(sso_id)
            .fetch_optional(pool)
            .await
    }

    /// Deactivate a user (the soft-delete mechanism; rows are never
    /// hard-deleted by normal flows).
    pub async fn deactivate(pool: &sqlx::PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(is_admin: bool, is_super_admin: bool) -> User {
        User {
            id: Uuid::new_v4(),
            sso_id: "subj-123".to_string(),
            email: "jan@corp.example".to_string(),
            display_name: "Jan Kowalski".to_string(),
            first_name: Some("Jan".to_string()),
            last_name: Some("Kowalski".to_string()),
            department: Some("Engineering".to_string()),
            job_title: None,
            sso_groups: vec!["eng-all".to_string()],
            is_active: true,
            is_admin,
            is_super_admin,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_id_round_trip() {
        let user = sample_user(false, false);
        assert_eq!(user.user_id().into_uuid(), user.id);
    }

    #[test]
    fn test_has_admin_role() {
        assert!(!sample_user(false, false).has_admin_role());
        assert!(sample_user(true, false).has_admin_role());
        assert!(sample_user(false, true).has_admin_role());
    }
}

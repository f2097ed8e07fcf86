//! Application access grant model.
//!
//! An access-control edge from either a user or a group to an application.
//! Exactly one of `user_id` / `group_id` is set (enforced by a CHECK
//! constraint). Grants are binary and real-time: created by grant
//! operations, deleted by revoke operations, no soft delete.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A single access-control edge.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AccessGrant {
    pub id: Uuid,
    pub application_id: Uuid,
    /// Set when this is a direct per-user grant.
    pub user_id: Option<Uuid>,
    /// Set when this is a group grant.
    pub group_id: Option<Uuid>,
    /// Administrator who created the grant.
    pub granted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl AccessGrant {
    /// Grant an application to a user. Idempotent: an existing grant is
    /// left untouched and returned.
    pub async fn grant_to_user(
        pool: &sqlx::PgPool,
        application_id: Uuid,
        user_id: Uuid,
        granted_by: Option<Uuid>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            INSERT INTO application_access (application_id, user_id, granted_by)
            VALUES ($1, $2, $3)
            ON CONFLICT (application_id, user_id) DO UPDATE SET application_id = EXCLUDED.application_id
            RETURNING *
            ",
        )
        .bind(application_id)
        .bind(user_id)
        .bind(granted_by)
        .fetch_one(pool)
        .await
    }

    /// Grant an application to a group. Idempotent.
    pub async fn grant_to_group(
        pool: &sqlx::PgPool,
        application_id: Uuid,
        group_id: Uuid,
        granted_by: Option<Uuid>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            INSERT INTO application_access (application_id, group_id, granted_by)
            VALUES ($1, $2, $3)
            ON CONFLICT (application_id, group_id) DO UPDATE SET application_id = EXCLUDED.application_id
            RETURNING *
            ",
        )
        .bind(application_id)
        .bind(group_id)
        .bind(granted_by)
        .fetch_one(pool)
        .await
    }

    /// Revoke a grant by its id.
    pub async fn revoke(pool: &sqlx::PgPool, grant_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM application_access WHERE id = $1")
            .bind(grant_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke a user's direct grant for an application.
    pub async fn revoke_for_user(
        pool: &sqlx::PgPool,
        application_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM application_access WHERE application_id = $1 AND user_id = $2",
        )
        .bind(application_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke a group's grant for an application.
    pub async fn revoke_for_group(
        pool: &sqlx::PgPool,
        application_id: Uuid,
        group_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM application_access WHERE application_id = $1 AND group_id = $2",
        )
        .bind(application_id)
        .bind(group_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List all grants for an application.
    pub async fn list_for_application(
        pool: &sqlx::PgPool,
        application_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM application_access
            WHERE application_id = $1
            ORDER BY created_at
            ",
        )
        .bind(application_id)
        .fetch_all(pool)
        .await
    }

    /// Whether a grant reaches the user, either directly or through any
    /// group the user belongs to.
    pub async fn exists_for_user(
        pool: &sqlx::PgPool,
        application_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            r"
            SELECT EXISTS(
                SELECT 1 FROM application_access aa
                WHERE aa.application_id = $1
                  AND (
                    aa.user_id = $2
                    OR aa.group_id IN (
                        SELECT group_id FROM user_group_members WHERE user_id = $2
                    )
                  )
            )
            ",
        )
        .bind(application_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}

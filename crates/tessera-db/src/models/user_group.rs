//! User group model.
//!
//! A named collection of users with a display color, usable as an
//! access-control unit. Deleting a group cascades its access grants and
//! membership links (FK `ON DELETE CASCADE`) but never the member users.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A named user collection.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserGroup {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Display color (hex) shown in the portal.
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl UserGroup {
    /// Create a new group.
    pub async fn create(
        pool: &sqlx::PgPool,
        name: &str,
        description: Option<&str>,
        color: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            INSERT INTO user_groups (name, description, color)
            VALUES ($1, $2, $3)
            RETURNING *
            ",
        )
        .bind(name)
        .bind(description)
        .bind(color)
        .fetch_one(pool)
        .await
    }

    /// Find a group by ID.
    pub async fn find_by_id(pool: &sqlx::PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM user_groups WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a group. Membership links and access grants cascade; member
    /// user rows are untouched.
    pub async fn delete(pool: &sqlx::PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_groups WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Add a user to the group. Idempotent.
    pub async fn add_member(
        pool: &sqlx::PgPool,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            INSERT INTO user_group_members (group_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(group_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Remove a user from the group.
    pub async fn remove_member(
        pool: &sqlx::PgPool,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM user_group_members WHERE group_id = $1 AND user_id = $2")
                .bind(group_id)
                .bind(user_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List the ids of the group's members.
    pub async fn member_ids(pool: &sqlx::PgPool, group_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar("SELECT user_id FROM user_group_members WHERE group_id = $1")
            .bind(group_id)
            .fetch_all(pool)
            .await
    }
}

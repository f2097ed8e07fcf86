//! Application entity model.
//!
//! A registered downstream service acting as an OAuth2 client. The
//! administrator's two delete semantics are an explicit lifecycle state:
//! `Deactivated` is the reversible soft delete, `Deleted` is a terminal
//! tombstone whose grants, codes and tokens are purged (the row is kept so
//! `client_id` history stays unique).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Explicit application lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Visible and usable as an OAuth2 client.
    Active,
    /// Soft-deleted: hidden from the portal, rejected at the protocol
    /// endpoints, reversible by an administrator.
    Deactivated,
    /// Permanently deleted. Terminal; related grants, codes and tokens are
    /// purged when this state is entered.
    Deleted,
}

/// A registered application (OAuth2 client).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Application {
    /// Unique identifier.
    pub id: Uuid,

    /// Human-readable name.
    pub name: String,

    /// URL-safe unique slug.
    pub slug: String,

    /// Description shown in the portal.
    pub description: Option<String>,

    /// Application home URL.
    pub base_url: Option<String>,

    /// Icon URL shown in the portal.
    pub icon_url: Option<String>,

    /// Generated public client identifier (`tsr_` prefix; not a secret).
    pub client_id: String,

    /// Argon2id hash of the client secret. The plaintext is shown exactly
    /// once at creation/regeneration and never persisted.
    pub client_secret_hash: String,

    /// Registered redirect URIs (exact-match allowlist).
    pub redirect_uris: Vec<String>,

    /// Departments whose members are granted access without an explicit
    /// grant (empty = no department-based access).
    pub allowed_departments: Vec<String>,

    /// Lifecycle state.
    pub status: ApplicationStatus,

    /// Visible in the portal without an explicit access grant.
    pub is_public: bool,

    /// Portal sort order (ascending; ties broken by name).
    pub sort_order: i32,

    /// When the application was registered.
    pub created_at: DateTime<Utc>,

    /// When the application was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a new application.
#[derive(Debug, Clone)]
pub struct CreateApplication {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub base_url: Option<String>,
    pub icon_url: Option<String>,
    pub client_id: String,
    pub client_secret_hash: String,
    pub redirect_uris: Vec<String>,
    pub allowed_departments: Vec<String>,
    pub is_public: bool,
    pub sort_order: i32,
}

impl Application {
    /// Whether the application is usable as an OAuth2 client.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ApplicationStatus::Active
    }

    /// Whether `redirect_uri` exactly matches a registered redirect URI.
    ///
    /// Exact string equality only: no prefix, suffix or wildcard matching,
    /// so `https://app/cb` never matches `https://app/cb/` or
    /// `https://app/cb?x=1`.
    #[must_use]
    pub fn redirect_uri_registered(&self, redirect_uri: &str) -> bool {
        self.redirect_uris.iter().any(|r| r == redirect_uri)
    }

    /// Register a new application.
    pub async fn insert(
        pool: &sqlx::PgPool,
        input: CreateApplication,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            INSERT INTO applications (
                name, slug, description, base_url, icon_url,
                client_id, client_secret_hash, redirect_uris,
                allowed_departments, is_public, sort_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            ",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.base_url)
        .bind(&input.icon_url)
        .bind(&input.client_id)
        .bind(&input.client_secret_hash)
        .bind(&input.redirect_uris)
        .bind(&input.allowed_departments)
        .bind(input.is_public)
        .bind(input.sort_order)
        .fetch_one(pool)
        .await
    }

    /// Find an application by internal ID.
    pub async fn find_by_id(pool: &sqlx::PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an application by its public `client_id`.
    pub async fn find_by_client_id(
        pool: &sqlx::PgPool,
        client_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM applications WHERE client_id = $1")
            .bind(client_id)
            .fetch_optional(pool)
            .await
    }

    /// Find an application by slug.
    pub async fn find_by_slug(
        pool: &sqlx::PgPool,
        slug: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM applications WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List all non-deleted applications in portal order.
    pub async fn list(pool: &sqlx::PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM applications
            WHERE status <> 'deleted'
            ORDER BY sort_order, name
            ",
        )
        .fetch_all(pool)
        .await
    }

    /// Replace the stored secret hash. The previous secret stops verifying
    /// immediately.
    pub async fn update_secret_hash(
        pool: &sqlx::PgPool,
        id: Uuid,
        client_secret_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r"
            UPDATE applications
            SET client_secret_hash = $1, updated_at = NOW()
            WHERE id = $2 AND status <> 'deleted'
            ",
        )
        .bind(client_secret_hash)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Transition the lifecycle state. `Deleted` is terminal and cannot be
    /// left.
    pub async fn set_status(
        pool: &sqlx::PgPool,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r"
            UPDATE applications
            SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status <> 'deleted'
            ",
        )
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set portal visibility without an explicit grant.
    pub async fn set_public(
        pool: &sqlx::PgPool,
        id: Uuid,
        is_public: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE applications SET is_public = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(is_public)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete: purge grants, codes and tokens, then mark the row
    /// `deleted`. The tombstone keeps `client_id`/`slug` history unique.
    pub async fn purge(pool: &sqlx::PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM authorization_codes WHERE application_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM oauth_tokens WHERE application_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM application_access WHERE application_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query(
            "UPDATE applications SET status = 'deleted', updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_app(status: ApplicationStatus) -> Application {
        Application {
            id: Uuid::new_v4(),
            name: "CRM".to_string(),
            slug: "crm".to_string(),
            description: None,
            base_url: Some("https://crm.corp".to_string()),
            icon_url: None,
            client_id: "tsr_0123456789abcdef0123456789abcdef".to_string(),
            client_secret_hash: "$argon2id$...".to_string(),
            redirect_uris: vec!["https://crm.corp/cb".to_string()],
            allowed_departments: vec![],
            status,
            is_public: false,
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_active_per_status() {
        assert!(sample_app(ApplicationStatus::Active).is_active());
        assert!(!sample_app(ApplicationStatus::Deactivated).is_active());
        assert!(!sample_app(ApplicationStatus::Deleted).is_active());
    }

    #[test]
    fn test_redirect_uri_matching_is_exact() {
        let app = sample_app(ApplicationStatus::Active);

        assert!(app.redirect_uri_registered("https://crm.corp/cb"));
        // No partial/prefix matching
        assert!(!app.redirect_uri_registered("https://crm.corp/cb/"));
        assert!(!app.redirect_uri_registered("https://crm.corp/cb?x=1"));
        assert!(!app.redirect_uri_registered("https://crm.corp/c"));
        assert!(!app.redirect_uri_registered("http://crm.corp/cb"));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ApplicationStatus::Deactivated).unwrap(),
            "\"deactivated\""
        );
    }
}

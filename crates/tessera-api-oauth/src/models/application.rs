//! Application management models (collaborator boundary for the admin UI).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_db::models::{Application, ApplicationStatus};
use utoipa::ToSchema;
use uuid::Uuid;

/// Request body for registering a new application.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateApplicationRequest {
    pub name: String,
    /// URL-safe unique slug.
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
    /// Exact-match redirect URI allowlist.
    pub redirect_uris: Vec<String>,
    #[serde(default)]
    pub allowed_departments: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub sort_order: i32,
}

/// Application details without secret material.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    pub client_id: String,
    pub redirect_uris: Vec<String>,
    pub allowed_departments: Vec<String>,
    #[schema(value_type = String)]
    pub status: ApplicationStatus,
    pub is_public: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Application> for ApplicationResponse {
    fn from(app: Application) -> Self {
        Self {
            id: app.id,
            name: app.name,
            slug: app.slug,
            description: app.description,
            base_url: app.base_url,
            icon_url: app.icon_url,
            client_id: app.client_id,
            redirect_uris: app.redirect_uris,
            allowed_departments: app.allowed_departments,
            status: app.status,
            is_public: app.is_public,
            sort_order: app.sort_order,
            created_at: app.created_at,
            updated_at: app.updated_at,
        }
    }
}

/// Application details plus the plaintext secret.
///
/// Returned exactly once, at creation or secret regeneration. The
/// plaintext is never persisted; losing it requires regeneration.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApplicationWithSecret {
    #[serde(flatten)]
    pub application: ApplicationResponse,
    pub client_secret: String,
}

/// Portal listing entry (no client material at all).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApplicationListItem {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    pub is_public: bool,
}

impl From<Application> for ApplicationListItem {
    fn from(app: Application) -> Self {
        Self {
            id: app.id,
            name: app.name,
            slug: app.slug,
            description: app.description,
            base_url: app.base_url,
            icon_url: app.icon_url,
            is_public: app.is_public,
        }
    }
}

/// Request body for granting access.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AccessGrantRequest {
    pub application_id: Uuid,
    #[serde(default)]
    pub user_ids: Vec<Uuid>,
    #[serde(default)]
    pub group_ids: Vec<Uuid>,
}

/// Request body for revoking access.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AccessRevokeRequest {
    pub application_id: Uuid,
    #[serde(default)]
    pub user_ids: Vec<Uuid>,
    #[serde(default)]
    pub group_ids: Vec<Uuid>,
}

/// Response for grant/revoke operations.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccessChangeResponse {
    /// Number of grants created or removed.
    pub changed: u64,
}

/// A token-pair row as listed for an application (no token material - only
/// hashes are stored, and not even those are exposed).
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenListItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub scopes: Vec<String>,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<tessera_db::models::OAuthToken> for TokenListItem {
    fn from(token: tessera_db::models::OAuthToken) -> Self {
        Self {
            id: token.id,
            user_id: token.user_id,
            scopes: token.scopes,
            expires_at: token.expires_at,
            revoked_at: token.revoked_at,
            created_at: token.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_with_secret_flattens() {
        let now = Utc::now();
        let response = ApplicationWithSecret {
            application: ApplicationResponse {
                id: Uuid::new_v4(),
                name: "CRM".to_string(),
                slug: "crm".to_string(),
                description: None,
                base_url: None,
                icon_url: None,
                client_id: "tsr_abc".to_string(),
                redirect_uris: vec!["https://crm.corp/cb".to_string()],
                allowed_departments: vec![],
                status: ApplicationStatus::Active,
                is_public: false,
                sort_order: 0,
                created_at: now,
                updated_at: now,
            },
            client_secret: "plaintext-once".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        // Flattened: client_id and client_secret are siblings
        assert!(json.contains("\"client_id\":\"tsr_abc\""));
        assert!(json.contains("\"client_secret\":\"plaintext-once\""));
    }
}

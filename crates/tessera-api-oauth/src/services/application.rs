//! Application (OAuth2 client) service.
//!
//! Registration, credential generation and verification, secret rotation,
//! and the two delete semantics (deactivate vs. permanent purge).

use crate::error::OAuthError;
use crate::models::CreateApplicationRequest;
use rand::rngs::OsRng;
use rand::RngCore;
use tessera_auth::{hash_secret, verify_secret};
use tessera_db::models::{Application, ApplicationStatus, CreateApplication, OAuthToken};
use tessera_db::DbPool;
use uuid::Uuid;

/// Prefix carried by every generated client id. Makes credentials
/// recognizable in logs and support tickets; the id itself is not secret.
pub const CLIENT_ID_PREFIX: &str = "tsr_";

/// Length of generated client ids (bytes before hex encoding).
const CLIENT_ID_LENGTH: usize = 16;

/// Length of generated client secrets (bytes before hex encoding).
const CLIENT_SECRET_LENGTH: usize = 32;

/// Service for managing registered applications.
#[derive(Debug, Clone)]
pub struct ApplicationService {
    pool: DbPool,
}

impl ApplicationService {
    /// Create a new application service.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the database pool.
    #[must_use]
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Generate a prefixed client id.
    ///
    /// SECURITY: uses `OsRng` directly from the operating system's CSPRNG.
    fn generate_client_id() -> String {
        let mut bytes = [0u8; CLIENT_ID_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        format!("{CLIENT_ID_PREFIX}{}", hex::encode(bytes))
    }

    /// Generate a client secret.
    ///
    /// SECURITY: uses `OsRng` directly from the operating system's CSPRNG.
    fn generate_client_secret() -> String {
        let mut bytes = [0u8; CLIENT_SECRET_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Register a new application.
    ///
    /// Returns the application together with the plaintext client secret.
    /// The plaintext exists only in this return value; the row stores an
    /// Argon2id hash.
    pub async fn create_application(
        &self,
        request: CreateApplicationRequest,
    ) -> Result<(Application, String), OAuthError> {
        if Application::find_by_slug(&self.pool, &request.slug)
            .await?
            .is_some()
        {
            return Err(OAuthError::InvalidRequest(format!(
                "An application with slug '{}' already exists",
                request.slug
            )));
        }

        let client_id = Self::generate_client_id();
        let client_secret = Self::generate_client_secret();
        let client_secret_hash = hash_secret(&client_secret).map_err(|e| {
            tracing::error!(error = %e, "Failed to hash client secret");
            OAuthError::Internal("Failed to hash client secret".to_string())
        })?;

        let application = Application::insert(
            &self.pool,
            CreateApplication {
                name: request.name,
                slug: request.slug,
                description: request.description,
                base_url: request.base_url,
                icon_url: request.icon_url,
                client_id,
                client_secret_hash,
                redirect_uris: request.redirect_uris,
                allowed_departments: request.allowed_departments,
                is_public: request.is_public,
                sort_order: request.sort_order,
            },
        )
        .await?;

        tracing::info!(
            application_id = %application.id,
            slug = %application.slug,
            "Application registered"
        );

        Ok((application, client_secret))
    }

    /// Regenerate an application's client secret.
    ///
    /// The previous secret stops verifying immediately, and every live
    /// token pair issued to the application is revoked. Returns the new
    /// plaintext secret (shown once).
    pub async fn regenerate_secret(
        &self,
        application_id: Uuid,
    ) -> Result<(Application, String), OAuthError> {
        let application = Application::find_by_id(&self.pool, application_id)
            .await?
            .ok_or(OAuthError::ApplicationNotFound)?;

        let client_secret = Self::generate_client_secret();
        let client_secret_hash = hash_secret(&client_secret).map_err(|e| {
            tracing::error!(error = %e, "Failed to hash client secret");
            OAuthError::Internal("Failed to hash client secret".to_string())
        })?;

        if !Application::update_secret_hash(&self.pool, application_id, &client_secret_hash).await?
        {
            return Err(OAuthError::ApplicationNotFound);
        }

        let revoked = OAuthToken::revoke_all_for_application(&self.pool, application_id).await?;
        tracing::info!(
            application_id = %application_id,
            revoked_tokens = revoked,
            "Client secret regenerated"
        );

        let application = Application::find_by_id(&self.pool, application_id)
            .await?
            .unwrap_or(application);

        Ok((application, client_secret))
    }

    /// Verify client credentials against the stored hash.
    ///
    /// # Security
    ///
    /// Every failure returns the same generic message to prevent client
    /// enumeration; the specific reason is only logged. The Argon2 verify
    /// itself is constant-time in the secret.
    pub async fn verify_client_credentials(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Application, OAuthError> {
        const GENERIC_AUTH_ERROR: &str = "Invalid client credentials";

        let application = match Application::find_by_client_id(&self.pool, client_id).await? {
            Some(app) => app,
            None => {
                tracing::warn!(client_id = %client_id, "Client authentication failed: unknown client");
                return Err(OAuthError::InvalidClient(GENERIC_AUTH_ERROR.to_string()));
            }
        };

        if !application.is_active() {
            tracing::warn!(
                client_id = %client_id,
                status = ?application.status,
                "Client authentication failed: application not active"
            );
            return Err(OAuthError::InvalidClient(GENERIC_AUTH_ERROR.to_string()));
        }

        let is_valid =
            verify_secret(client_secret, &application.client_secret_hash).map_err(|e| {
                tracing::error!(error = %e, "Secret verification error");
                OAuthError::Internal("Credential verification failed".to_string())
            })?;

        if !is_valid {
            tracing::warn!(client_id = %client_id, "Client authentication failed: bad secret");
            return Err(OAuthError::InvalidClient(GENERIC_AUTH_ERROR.to_string()));
        }

        Ok(application)
    }

    /// Resolve an active application by public client id.
    pub async fn get_active_by_client_id(
        &self,
        client_id: &str,
    ) -> Result<Application, OAuthError> {
        let application = Application::find_by_client_id(&self.pool, client_id)
            .await?
            .ok_or(OAuthError::ApplicationNotFound)?;

        if !application.is_active() {
            return Err(OAuthError::ApplicationNotFound);
        }

        Ok(application)
    }

    /// Deactivate an application (reversible soft delete). Live token
    /// pairs are revoked.
    pub async fn deactivate(&self, application_id: Uuid) -> Result<(), OAuthError> {
        if !Application::set_status(&self.pool, application_id, ApplicationStatus::Deactivated)
            .await?
        {
            return Err(OAuthError::ApplicationNotFound);
        }

        let revoked = OAuthToken::revoke_all_for_application(&self.pool, application_id).await?;
        tracing::info!(
            application_id = %application_id,
            revoked_tokens = revoked,
            "Application deactivated"
        );
        Ok(())
    }

    /// Permanently delete an application: purge its grants, codes and
    /// tokens and mark the row `deleted` (terminal).
    pub async fn purge(&self, application_id: Uuid) -> Result<(), OAuthError> {
        if !Application::purge(&self.pool, application_id).await? {
            return Err(OAuthError::ApplicationNotFound);
        }
        tracing::info!(application_id = %application_id, "Application permanently deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_has_prefix_and_length() {
        let id = ApplicationService::generate_client_id();
        assert!(id.starts_with("tsr_"));
        // 16 bytes hex encoded = 32 chars + 4-char prefix
        assert_eq!(id.len(), 36);
        assert!(id["tsr_".len()..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_client_id_unique() {
        assert_ne!(
            ApplicationService::generate_client_id(),
            ApplicationService::generate_client_id()
        );
    }

    #[test]
    fn test_client_secret_length_and_uniqueness() {
        let secret = ApplicationService::generate_client_secret();
        // 32 bytes hex encoded = 64 chars
        assert_eq!(secret.len(), 64);
        assert_ne!(secret, ApplicationService::generate_client_secret());
    }
}

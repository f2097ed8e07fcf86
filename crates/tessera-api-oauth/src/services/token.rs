//! Token service: the full lifecycle of access/refresh token pairs.
//!
//! A pair moves `valid → expired` (passively, after one hour) or
//! `valid → revoked` (explicitly, or superseded by refresh rotation); both
//! states are terminal. Token strings are opaque 32-byte random values,
//! stored only as SHA-256 hashes.

use crate::error::OAuthError;
use crate::models::{TokenListItem, TokenResponse, ACCESS_TOKEN_EXPIRY_SECS};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tessera_db::models::{Application, AuthorizationCode, NewOAuthToken, OAuthToken, User};
use tessera_db::DbPool;
use uuid::Uuid;

/// Token length in bytes (32 bytes base64url = 43 characters).
const TOKEN_LENGTH: usize = 32;

/// Default maximum refresh lifetime in days.
pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 30;

/// A validated access token's context.
#[derive(Debug, Clone)]
pub struct ValidatedAccess {
    pub user: User,
    pub application: Application,
    pub scopes: Vec<String>,
}

/// Service for token issuance, validation, rotation and revocation.
#[derive(Debug, Clone)]
pub struct TokenService {
    pool: DbPool,
    /// Maximum refresh lifetime measured from pair issuance.
    refresh_ttl: Duration,
}

impl TokenService {
    /// Create a new token service with the default refresh lifetime.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self::with_refresh_ttl_days(pool, DEFAULT_REFRESH_TTL_DAYS)
    }

    /// Create a new token service with a configured maximum refresh
    /// lifetime.
    #[must_use]
    pub fn with_refresh_ttl_days(pool: DbPool, days: i64) -> Self {
        Self {
            pool,
            refresh_ttl: Duration::days(days),
        }
    }

    /// Get the database pool.
    #[must_use]
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Generate an opaque token value.
    ///
    /// SECURITY: uses `OsRng` directly from the operating system's CSPRNG.
    fn generate_token_value() -> String {
        let mut bytes = [0u8; TOKEN_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Hash a token for storage/lookup.
    fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Mint and persist a fresh pair for a redeemed authorization code.
    ///
    /// The code has already been atomically consumed by the authorization
    /// store; this stage only creates state, so a storage failure here
    /// leaves no token half-issued.
    pub async fn issue_for_code(
        &self,
        code: &AuthorizationCode,
    ) -> Result<TokenResponse, OAuthError> {
        self.mint_pair(code.user_id, code.application_id, code.scopes.clone())
            .await
    }

    /// Rotate a refresh token: revoke the presented pair and mint an
    /// entirely new one with the same user and scopes.
    ///
    /// The revocation is the atomic single-winner step; a replayed refresh
    /// token (after a successful rotation) finds the row revoked and fails
    /// `invalid_grant`. Rotation never extends the maximum refresh
    /// lifetime: a pair older than the policy threshold is rejected.
    pub async fn issue_from_refresh(
        &self,
        application: &Application,
        refresh_token: &str,
    ) -> Result<TokenResponse, OAuthError> {
        let refresh_hash = Self::hash_token(refresh_token);

        let old =
            OAuthToken::revoke_by_refresh_hash(&self.pool, application.id, &refresh_hash).await?;

        let Some(old) = old else {
            tracing::warn!(
                application_id = %application.id,
                "Refresh rejected: token unknown, revoked, or issued to another client"
            );
            return Err(OAuthError::InvalidGrant(
                "Invalid refresh token".to_string(),
            ));
        };

        // The pair is now revoked either way; an over-age refresh token
        // stays consumed.
        if Utc::now() >= old.created_at + self.refresh_ttl {
            tracing::info!(token_id = %old.id, "Refresh rejected: maximum refresh lifetime exceeded");
            return Err(OAuthError::InvalidGrant(
                "Refresh token has expired".to_string(),
            ));
        }

        self.mint_pair(old.user_id, old.application_id, old.scopes)
            .await
    }

    /// Validate a bearer access token and resolve its context.
    ///
    /// Fails `invalid_token` when the token is unknown, revoked, expired,
    /// or its user/application is no longer active.
    pub async fn validate_access_token(
        &self,
        access_token: &str,
    ) -> Result<ValidatedAccess, OAuthError> {
        const INVALID: &str = "Invalid or expired access token";

        let access_hash = Self::hash_token(access_token);

        let token = OAuthToken::find_by_access_hash(&self.pool, &access_hash)
            .await?
            .ok_or_else(|| OAuthError::InvalidToken(INVALID.to_string()))?;

        if !token.is_valid_at(Utc::now()) {
            return Err(OAuthError::InvalidToken(INVALID.to_string()));
        }

        let user = User::find_by_id(&self.pool, token.user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| OAuthError::InvalidToken(INVALID.to_string()))?;

        let application = Application::find_by_id(&self.pool, token.application_id)
            .await?
            .filter(Application::is_active)
            .ok_or_else(|| OAuthError::InvalidToken(INVALID.to_string()))?;

        Ok(ValidatedAccess {
            user,
            application,
            scopes: token.scopes,
        })
    }

    /// Revoke a token per RFC 7009.
    ///
    /// Accepts either token string of a pair; marks the matching row (if
    /// any, scoped to the authenticated client) revoked. Deliberately
    /// reports nothing about whether a token matched: revocation must not
    /// leak whether a token ever existed.
    pub async fn revoke(
        &self,
        application: &Application,
        token: &str,
        token_type_hint: Option<&str>,
    ) -> Result<(), OAuthError> {
        let token_hash = Self::hash_token(token);

        let revoked =
            OAuthToken::revoke_matching_hash(&self.pool, application.id, &token_hash).await?;

        tracing::info!(
            application_id = %application.id,
            revoked_rows = revoked,
            token_type_hint = ?token_type_hint,
            "Revocation request processed"
        );

        Ok(())
    }

    /// List token pairs issued for an application (collaborator boundary
    /// for the admin surface).
    pub async fn list_for_application(
        &self,
        application_id: Uuid,
    ) -> Result<Vec<TokenListItem>, OAuthError> {
        let tokens = OAuthToken::list_for_application(&self.pool, application_id).await?;
        Ok(tokens.into_iter().map(TokenListItem::from).collect())
    }

    /// Garbage-collect expired authorization codes and token pairs whose
    /// refresh lifetime has fully lapsed. Returns (codes, tokens) deleted.
    pub async fn purge_expired(&self) -> Result<(u64, u64), OAuthError> {
        let codes = AuthorizationCode::cleanup_expired(&self.pool).await?;
        let tokens = OAuthToken::cleanup_expired(&self.pool, self.refresh_ttl).await?;
        Ok((codes, tokens))
    }

    /// Mint, persist and return a fresh pair.
    async fn mint_pair(
        &self,
        user_id: Uuid,
        application_id: Uuid,
        scopes: Vec<String>,
    ) -> Result<TokenResponse, OAuthError> {
        let access_token = Self::generate_token_value();
        let refresh_token = Self::generate_token_value();
        let expires_at = Utc::now() + Duration::seconds(ACCESS_TOKEN_EXPIRY_SECS);

        OAuthToken::insert(
            &self.pool,
            NewOAuthToken {
                access_token_hash: Self::hash_token(&access_token),
                refresh_token_hash: Self::hash_token(&refresh_token),
                user_id,
                application_id,
                scopes: scopes.clone(),
                expires_at,
            },
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to persist token pair");
            OAuthError::Database(e)
        })?;

        Ok(TokenResponse::bearer(access_token, refresh_token, &scopes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_value_length() {
        let token = TokenService::generate_token_value();
        // 32 bytes base64url encoded = 43 characters
        assert_eq!(token.len(), 43);
    }

    #[test]
    fn test_token_values_unique() {
        assert_ne!(
            TokenService::generate_token_value(),
            TokenService::generate_token_value()
        );
    }

    #[test]
    fn test_token_hash_deterministic_hex() {
        let hash = TokenService::hash_token("some-token");
        assert_eq!(hash, TokenService::hash_token("some-token"));
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_access_and_refresh_hashes_differ() {
        assert_ne!(
            TokenService::hash_token("token-a"),
            TokenService::hash_token("token-b")
        );
    }
}

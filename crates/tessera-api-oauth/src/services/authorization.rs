//! Authorization code store.
//!
//! Issues and single-use-consumes the short-lived codes of the
//! authorization-code grant. Codes are 64-character random strings stored
//! only as SHA-256 hashes; consumption is a single-statement check-and-set
//! so exactly one of any number of concurrent redemption attempts wins.

use crate::error::OAuthError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tessera_db::models::{Application, AuthorizationCode, NewAuthorizationCode};
use tessera_db::DbPool;
use thiserror::Error;
use uuid::Uuid;

/// Authorization code length in bytes (48 bytes base64url = 64 characters).
const AUTH_CODE_LENGTH: usize = 48;

/// Authorization code expiration in minutes.
const AUTH_CODE_EXPIRY_MINUTES: i64 = 10;

/// Why a redemption failed.
///
/// The variants stay internal: every one of them collapses to
/// `invalid_grant` at the protocol boundary, while logs keep the specific
/// reason.
#[derive(Debug, Error)]
pub enum CodeError {
    /// No code with this value was ever issued (or it was purged).
    #[error("Authorization code not found")]
    NotFound,

    /// The code was already consumed once. A second redemption is a
    /// possible interception/replay signal.
    #[error("Authorization code has already been used")]
    AlreadyUsed,

    /// The code is past its 10-minute lifetime.
    #[error("Authorization code has expired")]
    Expired,

    /// The code was issued to a different application.
    #[error("Authorization code was issued to a different client")]
    ClientMismatch,

    /// The redemption redirect URI differs from the one the code was
    /// issued for.
    #[error("Redirect URI does not match the one the code was issued for")]
    RedirectMismatch,

    /// PKCE verification failed (missing or wrong verifier).
    #[error("PKCE code verifier is invalid")]
    PkceMismatch,

    /// Storage failure. Never reported to the client as `invalid_grant`.
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl CodeError {
    /// Map to the protocol-boundary error: `invalid_grant` for every
    /// client-caused variant, `server_error` for storage failures.
    #[must_use]
    pub fn into_oauth_error(self) -> OAuthError {
        match self {
            CodeError::Storage(e) => OAuthError::Database(e),
            other => {
                // Specific reason goes to the log only
                tracing::warn!(reason = %other, "Authorization code redemption failed");
                OAuthError::InvalidGrant("Authorization code is invalid".to_string())
            }
        }
    }
}

/// Service for issuing and consuming authorization codes.
#[derive(Debug, Clone)]
pub struct AuthorizationService {
    pool: DbPool,
}

impl AuthorizationService {
    /// Create a new authorization service.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Generate a cryptographically random authorization code.
    ///
    /// SECURITY: uses `OsRng` directly from the operating system's CSPRNG.
    /// 48 random bytes base64url-encode to exactly 64 characters.
    fn generate_code() -> String {
        let mut bytes = [0u8; AUTH_CODE_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Hash a code for storage.
    fn hash_code(code: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(code.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Compute an S256 PKCE challenge from a verifier.
    #[must_use]
    pub fn generate_code_challenge(code_verifier: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(code_verifier.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }

    /// Verify a PKCE verifier against a stored challenge.
    ///
    /// Constant-time comparison in both methods.
    #[must_use]
    pub fn verify_code_verifier(code_verifier: &str, challenge: &str, method: &str) -> bool {
        let computed = match method {
            "S256" => Self::generate_code_challenge(code_verifier),
            "plain" => code_verifier.to_string(),
            _ => return false,
        };
        subtle::ConstantTimeEq::ct_eq(computed.as_bytes(), challenge.as_bytes()).into()
    }

    /// Issue a new authorization code.
    ///
    /// The redirect URI must exactly match one registered entry - no
    /// partial or prefix matching, to keep the endpoint from becoming an
    /// open redirector. Returns the plaintext code; only its hash is
    /// stored, with a 10-minute expiry.
    #[allow(clippy::too_many_arguments)]
    pub async fn issue(
        &self,
        user_id: Uuid,
        application: &Application,
        redirect_uri: &str,
        scopes: Vec<String>,
        state: Option<&str>,
        code_challenge: Option<&str>,
        code_challenge_method: Option<&str>,
    ) -> Result<String, OAuthError> {
        if !application.redirect_uri_registered(redirect_uri) {
            return Err(OAuthError::InvalidRequest(
                "redirect_uri does not match any registered redirect URI".to_string(),
            ));
        }

        let code = Self::generate_code();
        let code_hash = Self::hash_code(&code);
        let expires_at = Utc::now() + Duration::minutes(AUTH_CODE_EXPIRY_MINUTES);

        AuthorizationCode::insert(
            &self.pool,
            NewAuthorizationCode {
                code_hash,
                user_id,
                application_id: application.id,
                redirect_uri: redirect_uri.to_string(),
                scopes,
                state: state.map(String::from),
                code_challenge: code_challenge.map(String::from),
                code_challenge_method: code_challenge_method.map(String::from),
                expires_at,
            },
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to persist authorization code");
            OAuthError::Database(e)
        })?;

        Ok(code)
    }

    /// Redeem a code: atomically consume it, then validate the binding.
    ///
    /// The check-and-set happens first and unconditionally, so the
    /// unused→used transition occurs exactly once even when the winner
    /// subsequently reports the code expired; any retry then fails as
    /// already-used.
    pub async fn redeem(
        &self,
        code: &str,
        application: &Application,
        redirect_uri: &str,
        code_verifier: Option<&str>,
    ) -> Result<AuthorizationCode, CodeError> {
        let code_hash = Self::hash_code(code);

        let Some(record) = AuthorizationCode::consume_by_hash(&self.pool, &code_hash).await? else {
            // Lost the check-and-set (or the code never existed). Classify
            // for the security log.
            return match AuthorizationCode::find_by_hash(&self.pool, &code_hash).await? {
                Some(existing) if existing.used => {
                    tracing::warn!(
                        code_id = %existing.id,
                        user_id = %existing.user_id,
                        application_id = %existing.application_id,
                        "Authorization code replay detected"
                    );
                    Err(CodeError::AlreadyUsed)
                }
                Some(_) => Err(CodeError::NotFound),
                None => Err(CodeError::NotFound),
            };
        };

        if record.is_expired_at(Utc::now()) {
            return Err(CodeError::Expired);
        }

        if record.application_id != application.id {
            return Err(CodeError::ClientMismatch);
        }

        // Exact match against the redirect URI the code was issued for
        if record.redirect_uri != redirect_uri {
            return Err(CodeError::RedirectMismatch);
        }

        if let Some(challenge) = record.code_challenge.as_deref() {
            let method = record.code_challenge_method.as_deref().unwrap_or("plain");
            let verifier = code_verifier.ok_or(CodeError::PkceMismatch)?;
            if !Self::verify_code_verifier(verifier, challenge, method) {
                return Err(CodeError::PkceMismatch);
            }
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_generation_length() {
        let code = AuthorizationService::generate_code();
        // 48 bytes base64url encoded = 64 characters
        assert_eq!(code.len(), 64);
    }

    #[test]
    fn test_code_generation_is_unique() {
        assert_ne!(
            AuthorizationService::generate_code(),
            AuthorizationService::generate_code()
        );
    }

    #[test]
    fn test_code_hash_is_hex_sha256() {
        let hash = AuthorizationService::hash_code("test-code");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        // Deterministic
        assert_eq!(hash, AuthorizationService::hash_code("test-code"));
    }

    #[test]
    fn test_pkce_challenge_rfc7636_vector() {
        // Test vector from RFC 7636 Appendix B
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        let expected = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";
        assert_eq!(
            AuthorizationService::generate_code_challenge(verifier),
            expected
        );
    }

    #[test]
    fn test_pkce_verification_s256() {
        let verifier = "some-verifier-that-is-long-enough-for-pkce-use";
        let challenge = AuthorizationService::generate_code_challenge(verifier);

        assert!(AuthorizationService::verify_code_verifier(
            verifier, &challenge, "S256"
        ));
        assert!(!AuthorizationService::verify_code_verifier(
            "wrong-verifier",
            &challenge,
            "S256"
        ));
    }

    #[test]
    fn test_pkce_verification_plain() {
        assert!(AuthorizationService::verify_code_verifier(
            "plain-value",
            "plain-value",
            "plain"
        ));
        assert!(!AuthorizationService::verify_code_verifier(
            "plain-value",
            "other-value",
            "plain"
        ));
    }

    #[test]
    fn test_pkce_verification_unknown_method() {
        assert!(!AuthorizationService::verify_code_verifier(
            "v", "v", "S512"
        ));
    }

    #[test]
    fn test_code_error_collapses_to_invalid_grant() {
        for err in [
            CodeError::NotFound,
            CodeError::AlreadyUsed,
            CodeError::Expired,
            CodeError::ClientMismatch,
            CodeError::RedirectMismatch,
            CodeError::PkceMismatch,
        ] {
            let oauth_err = err.into_oauth_error();
            assert!(
                matches!(oauth_err, OAuthError::InvalidGrant(_)),
                "expected invalid_grant, got {oauth_err:?}"
            );
        }
    }

    #[test]
    fn test_storage_error_does_not_collapse_to_invalid_grant() {
        let err = CodeError::Storage(sqlx::Error::PoolTimedOut);
        assert!(matches!(err.into_oauth_error(), OAuthError::Database(_)));
    }
}

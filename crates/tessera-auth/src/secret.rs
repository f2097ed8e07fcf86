//! Client-secret hashing with Argon2id.
//!
//! Registered applications authenticate to the token endpoint with a
//! `client_secret` that is stored only as a one-way Argon2id hash. The
//! plaintext is shown exactly once at creation or regeneration time.

use crate::error::AuthError;
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// Secret hasher configuration.
///
/// Uses OWASP 2024 recommended parameters for Argon2id:
/// - Memory: 19456 KiB (19 MiB)
/// - Iterations: 2
/// - Parallelism: 1
#[derive(Debug, Clone)]
pub struct SecretHasher {
    params: Params,
}

impl Default for SecretHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretHasher {
    /// Create a new hasher with OWASP-recommended parameters.
    #[must_use]
    pub fn new() -> Self {
        // m=19456 (19 MiB), t=2, p=1. These are hardcoded constants that are
        // always valid; failure would indicate a bug in the argon2 crate.
        let params = Params::new(
            19456, // m_cost: memory in KiB
            2,     // t_cost: iterations
            1,     // p_cost: parallelism
            None,  // output_len: default (32 bytes)
        )
        .expect("OWASP 2024 Argon2 parameters are valid constants");

        Self { params }
    }

    /// Create a hasher with custom parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid.
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AuthError::HashingFailed(format!("Invalid parameters: {e}")))?;

        Ok(Self { params })
    }

    /// Hash a secret using Argon2id.
    ///
    /// Returns a PHC-formatted hash string.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::HashingFailed` if hashing fails.
    pub fn hash(&self, secret: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());

        let hash = argon2
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| AuthError::HashingFailed(format!("Hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verify a secret against a stored hash.
    ///
    /// The underlying Argon2 verification is constant-time in the secret.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidHashFormat` if the stored hash is malformed.
    pub fn verify(&self, secret: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidHashFormat)?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());

        match argon2.verify_password(secret.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(_) => Ok(false), // Other errors also treated as non-match
        }
    }
}

/// Hash a client secret using Argon2id with OWASP-recommended parameters.
///
/// Convenience function using the default [`SecretHasher`].
///
/// # Example
///
/// ```rust
/// use tessera_auth::hash_secret;
///
/// let hash = hash_secret("my-client-secret").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_secret(secret: &str) -> Result<String, AuthError> {
    SecretHasher::new().hash(secret)
}

/// Verify a client secret against an Argon2id hash.
///
/// Convenience function using the default [`SecretHasher`].
///
/// # Example
///
/// ```rust
/// use tessera_auth::{hash_secret, verify_secret};
///
/// let hash = hash_secret("my-secret").unwrap();
/// assert!(verify_secret("my-secret", &hash).unwrap());
/// assert!(!verify_secret("wrong-secret", &hash).unwrap());
/// ```
pub fn verify_secret(secret: &str, hash: &str) -> Result<bool, AuthError> {
    SecretHasher::new().verify(secret, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_secret_returns_argon2id() {
        let hash = hash_secret("test-secret").unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_verify_secret_correct() {
        let secret = "correct-secret";
        let hash = hash_secret(secret).unwrap();
        assert!(verify_secret(secret, &hash).unwrap());
    }

    #[test]
    fn test_verify_secret_incorrect() {
        let hash = hash_secret("correct-secret").unwrap();
        assert!(!verify_secret("wrong-secret", &hash).unwrap());
    }

    #[test]
    fn test_verify_secret_invalid_hash_format() {
        let result = verify_secret("secret", "not-a-valid-hash");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), AuthError::InvalidHashFormat));
    }

    #[test]
    fn test_hash_is_salted() {
        let secret = "same-secret";
        let hash1 = hash_secret(secret).unwrap();
        let hash2 = hash_secret(secret).unwrap();

        // Same secret must produce different hashes (different salts)
        assert_ne!(hash1, hash2);
        assert!(verify_secret(secret, &hash1).unwrap());
        assert!(verify_secret(secret, &hash2).unwrap());
    }

    #[test]
    fn test_custom_params() {
        // Smaller params for faster testing
        let hasher = SecretHasher::with_params(4096, 1, 1).unwrap();
        let hash = hasher.hash("test-secret").unwrap();
        assert!(hasher.verify("test-secret", &hash).unwrap());
    }

    #[test]
    fn test_hash_format_contains_params() {
        let hash = hash_secret("test").unwrap();
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=19456"));
        assert!(hash.contains("t=2"));
        assert!(hash.contains("p=1"));
    }
}

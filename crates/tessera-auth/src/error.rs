//! Error types for authentication operations.

use thiserror::Error;

/// Authentication error types.
///
/// Each variant maps to a specific failure mode in session-token or
/// secret-hashing operations. Callers at the HTTP boundary collapse
/// `TokenExpired` and the invalid variants into one unauthenticated
/// response so the two are indistinguishable on the wire.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Session token errors
    /// Token has expired (exp claim is in the past).
    #[error("Token has expired")]
    TokenExpired,

    /// Token signature is invalid.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token format is malformed or invalid.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token uses an unsupported algorithm (only RS256 is allowed).
    #[error("Unsupported algorithm: only RS256 is allowed")]
    InvalidAlgorithm,

    /// Required claim is missing from token.
    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    // Secret errors
    /// Secret hashing operation failed.
    #[error("Secret hashing failed: {0}")]
    HashingFailed(String),

    /// Stored secret hash format is invalid.
    #[error("Invalid secret hash format")]
    InvalidHashFormat,

    // Key errors
    /// RSA key is invalid or malformed.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

impl AuthError {
    /// Check if this error indicates an expired token.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, AuthError::TokenExpired)
    }

    /// Check if this error is related to session-token validation.
    #[must_use]
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            AuthError::TokenExpired
                | AuthError::InvalidSignature
                | AuthError::InvalidToken(_)
                | AuthError::InvalidAlgorithm
                | AuthError::MissingClaim(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(AuthError::TokenExpired.to_string(), "Token has expired");
        assert_eq!(
            AuthError::InvalidSignature.to_string(),
            "Invalid token signature"
        );
        assert_eq!(
            AuthError::MissingClaim("sub".to_string()).to_string(),
            "Missing required claim: sub"
        );
    }

    #[test]
    fn test_is_expired() {
        assert!(AuthError::TokenExpired.is_expired());
        assert!(!AuthError::InvalidSignature.is_expired());
    }

    #[test]
    fn test_is_token_error() {
        assert!(AuthError::TokenExpired.is_token_error());
        assert!(AuthError::InvalidToken("x".to_string()).is_token_error());
        assert!(!AuthError::HashingFailed("x".to_string()).is_token_error());
    }
}

//! Session token claims.
//!
//! The browser session credential is a self-contained signed token encoding
//! the user's stable id and issuance time. Validity is a pure function of
//! `(claims, now)` so tests can inject time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tessera_core::UserId;
use uuid::Uuid;

/// Claims carried by a browser session token.
///
/// # Standard Claims (RFC 7519)
///
/// - `sub`: the user's stable id
/// - `iss`: issuer
/// - `exp`: expiration time (Unix timestamp)
/// - `iat`: issued at (Unix timestamp)
/// - `jti`: unique token identifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    /// Subject - the user's stable id.
    pub sub: String,

    /// Issuer - who created the token.
    pub iss: String,

    /// Expiration time as Unix timestamp.
    pub exp: i64,

    /// Issued at as Unix timestamp.
    pub iat: i64,

    /// Unique identifier for this token.
    pub jti: String,
}

impl SessionClaims {
    /// Create a new builder for constructing session claims.
    #[must_use]
    pub fn builder() -> SessionClaimsBuilder {
        SessionClaimsBuilder::default()
    }

    /// Check whether the token is expired at the given instant.
    ///
    /// Expiry is evaluated against an injected `now` rather than the wall
    /// clock so callers and tests share one deterministic definition.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }

    /// Parse the subject claim as a typed user id.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse().ok()
    }
}

/// Builder for constructing session claims.
#[derive(Debug, Default)]
pub struct SessionClaimsBuilder {
    sub: Option<String>,
    iss: Option<String>,
    exp: Option<i64>,
    iat: Option<i64>,
    jti: Option<String>,
}

impl SessionClaimsBuilder {
    /// Set the subject from a typed user id.
    #[must_use]
    pub fn subject(mut self, user_id: UserId) -> Self {
        self.sub = Some(user_id.to_string());
        self
    }

    /// Set the issuer.
    #[must_use]
    pub fn issuer(mut self, iss: impl Into<String>) -> Self {
        self.iss = Some(iss.into());
        self
    }

    /// Set expiration as seconds from now.
    #[must_use]
    pub fn expires_in_secs(mut self, secs: i64) -> Self {
        self.exp = Some((Utc::now() + Duration::seconds(secs)).timestamp());
        self
    }

    /// Set an explicit issued-at timestamp (tests inject time here).
    #[must_use]
    pub fn issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Build the session claims.
    ///
    /// Defaults: `iat` = now, `exp` = now + 12 hours, fresh random `jti`.
    #[must_use]
    pub fn build(self) -> SessionClaims {
        let now = Utc::now().timestamp();

        SessionClaims {
            sub: self.sub.unwrap_or_default(),
            iss: self.iss.unwrap_or_default(),
            exp: self.exp.unwrap_or(now + 12 * 3600),
            iat: self.iat.unwrap_or(now),
            jti: self.jti.unwrap_or_else(|| Uuid::new_v4().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let user_id = UserId::new();
        let claims = SessionClaims::builder()
            .subject(user_id)
            .issuer("tessera")
            .build();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.iss, "tessera");
        assert!(claims.exp > claims.iat);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_is_expired_at_is_pure_in_now() {
        let claims = SessionClaims::builder()
            .subject(UserId::new())
            .issued_at(1_000_000)
            .build();

        let before = DateTime::from_timestamp(claims.exp - 1, 0).unwrap();
        let exactly = DateTime::from_timestamp(claims.exp, 0).unwrap();
        let after = DateTime::from_timestamp(claims.exp + 1, 0).unwrap();

        assert!(!claims.is_expired_at(before));
        assert!(!claims.is_expired_at(exactly));
        assert!(claims.is_expired_at(after));
    }

    #[test]
    fn test_user_id_round_trip() {
        let user_id = UserId::new();
        let claims = SessionClaims::builder().subject(user_id).build();
        assert_eq!(claims.user_id(), Some(user_id));
    }

    #[test]
    fn test_user_id_invalid_subject() {
        let mut claims = SessionClaims::builder().subject(UserId::new()).build();
        claims.sub = "not-a-uuid".to_string();
        assert!(claims.user_id().is_none());
    }

    #[test]
    fn test_jti_is_unique() {
        let a = SessionClaims::builder().subject(UserId::new()).build();
        let b = SessionClaims::builder().subject(UserId::new()).build();
        assert_ne!(a.jti, b.jti);
    }
}

//! Session token and secret hashing library for tessera.
//!
//! This crate provides:
//! - RS256 session-token encoding and decoding with typed claims
//! - Argon2id hashing for client secrets (OWASP-recommended parameters)
//!
//! # Example
//!
//! ```rust,ignore
//! use tessera_auth::{encode_session, decode_session, SessionClaims, hash_secret, verify_secret};
//!
//! let claims = SessionClaims::builder()
//!     .subject(user_id)
//!     .issuer("tessera")
//!     .expires_in_secs(43_200)
//!     .build();
//!
//! let token = encode_session(&claims, private_key_pem)?;
//! let decoded = decode_session(&token, public_key_pem)?;
//!
//! let hash = hash_secret("client-secret-plaintext")?;
//! let ok = verify_secret("client-secret-plaintext", &hash)?;
//! ```

mod claims;
mod error;
mod jwt;
mod secret;

pub use claims::{SessionClaims, SessionClaimsBuilder};
pub use error::AuthError;
pub use jwt::{decode_session, decode_session_with_config, encode_session, ValidationConfig};
pub use secret::{hash_secret, verify_secret, SecretHasher};

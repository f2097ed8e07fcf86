//! JWKS fetching and ID-token signature verification.
//!
//! The provider's published keys are fetched from its `jwks_uri` and every
//! ID token is verified (RS256 signature, issuer, audience, expiry) before
//! any claim is read; the token-exchange transport alone is never trusted.

use crate::error::FederationError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// JWKS cache lifetime. Key rotation at the provider is picked up within
/// this window; an unknown kid forces an immediate refresh.
const JWKS_CACHE_TTL: Duration = Duration::from_secs(600);

/// A JSON Web Key (the RSA subset tessera consumes).
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(default)]
    pub kid: Option<String>,
    #[serde(rename = "use", default)]
    pub key_use: Option<String>,
    #[serde(default)]
    pub n: Option<String>,
    #[serde(default)]
    pub e: Option<String>,
}

/// A JSON Web Key Set as served from the provider's `jwks_uri`.
#[derive(Debug, Clone, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Find a usable RSA signing key, preferring an exact kid match.
    fn find_key(&self, kid: Option<&str>) -> Option<&Jwk> {
        let candidates = self
            .keys
            .iter()
            .filter(|k| k.kty == "RSA" && k.key_use.as_deref().map_or(true, |u| u == "sig"));

        match kid {
            Some(kid) => candidates.clone().find(|k| k.kid.as_deref() == Some(kid)),
            None => candidates.clone().next(),
        }
    }
}

/// JWKS client with a single-provider cache.
#[derive(Clone)]
pub struct JwksClient {
    http: reqwest::Client,
    cache: Arc<RwLock<Option<(JwkSet, Instant)>>>,
}

impl JwksClient {
    /// Create a new JWKS client sharing the federation HTTP client.
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Verify an ID token against the provider's JWKS and return its
    /// payload.
    ///
    /// Validates: RS256 signature, `iss`, `aud` (our `client_id`), and
    /// `exp` (60s leeway). The nonce is validated by the caller against the
    /// stored login session.
    pub async fn verify_id_token(
        &self,
        id_token: &str,
        jwks_uri: &str,
        expected_issuer: &str,
        expected_audience: &str,
    ) -> Result<serde_json::Value, FederationError> {
        let header = decode_header(id_token)
            .map_err(|e| FederationError::InvalidIdToken(format!("invalid header: {e}")))?;

        if header.alg != Algorithm::RS256 {
            return Err(FederationError::InvalidIdToken(format!(
                "unsupported algorithm {:?}",
                header.alg
            )));
        }

        let key = self
            .decoding_key(jwks_uri, header.kid.as_deref())
            .await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = 60;
        validation.set_issuer(&[expected_issuer]);
        validation.set_audience(&[expected_audience]);

        let data = decode::<serde_json::Value>(id_token, &key, &validation)
            .map_err(|e| FederationError::InvalidIdToken(e.to_string()))?;

        Ok(data.claims)
    }

    /// Resolve a decoding key for the given kid, refreshing the cached key
    /// set when the kid is unknown (rotation).
    async fn decoding_key(
        &self,
        jwks_uri: &str,
        kid: Option<&str>,
    ) -> Result<DecodingKey, FederationError> {
        if let Some(cached) = self.cached_set().await {
            if let Some(jwk) = cached.find_key(kid) {
                return Self::to_decoding_key(jwk);
            }
        }

        // Cache miss or unknown kid: refresh from the provider
        let set = self.fetch(jwks_uri).await?;
        let jwk = set.find_key(kid).ok_or_else(|| {
            FederationError::JwksFetchFailed(format!(
                "no RSA signing key for kid {}",
                kid.unwrap_or("<none>")
            ))
        })?;

        Self::to_decoding_key(jwk)
    }

    async fn cached_set(&self) -> Option<JwkSet> {
        let cache = self.cache.read().await;
        cache.as_ref().and_then(|(set, fetched_at)| {
            (fetched_at.elapsed() < JWKS_CACHE_TTL).then(|| set.clone())
        })
    }

    async fn fetch(&self, jwks_uri: &str) -> Result<JwkSet, FederationError> {
        let response = self
            .http
            .get(jwks_uri)
            .send()
            .await
            .map_err(|e| FederationError::JwksFetchFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FederationError::JwksFetchFailed(format!(
                "jwks endpoint returned HTTP {}",
                response.status()
            )));
        }

        let set: JwkSet = response
            .json()
            .await
            .map_err(|e| FederationError::JwksFetchFailed(e.to_string()))?;

        let mut cache = self.cache.write().await;
        *cache = Some((set.clone(), Instant::now()));

        Ok(set)
    }

    fn to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, FederationError> {
        let n = jwk
            .n
            .as_deref()
            .ok_or_else(|| FederationError::JwksFetchFailed("JWK missing modulus".to_string()))?;
        let e = jwk
            .e
            .as_deref()
            .ok_or_else(|| FederationError::JwksFetchFailed("JWK missing exponent".to_string()))?;

        // Sanity-check the base64url encoding before handing to jsonwebtoken
        URL_SAFE_NO_PAD
            .decode(n)
            .map_err(|e| FederationError::JwksFetchFailed(format!("bad modulus encoding: {e}")))?;

        DecodingKey::from_rsa_components(n, e)
            .map_err(|e| FederationError::JwksFetchFailed(format!("unusable JWK: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rsa_jwk(kid: &str, key_use: Option<&str>) -> Jwk {
        Jwk {
            kty: "RSA".to_string(),
            kid: Some(kid.to_string()),
            key_use: key_use.map(String::from),
            n: Some("AQAB".to_string()),
            e: Some("AQAB".to_string()),
        }
    }

    #[test]
    fn test_find_key_by_kid() {
        let set = JwkSet {
            keys: vec![rsa_jwk("a", Some("sig")), rsa_jwk("b", Some("sig"))],
        };

        assert_eq!(
            set.find_key(Some("b")).and_then(|k| k.kid.as_deref()),
            Some("b")
        );
        assert!(set.find_key(Some("missing")).is_none());
    }

    #[test]
    fn test_find_key_without_kid_takes_first_signing_key() {
        let set = JwkSet {
            keys: vec![rsa_jwk("enc", Some("enc")), rsa_jwk("sig", Some("sig"))],
        };

        assert_eq!(
            set.find_key(None).and_then(|k| k.kid.as_deref()),
            Some("sig")
        );
    }

    #[test]
    fn test_find_key_skips_non_rsa() {
        let set = JwkSet {
            keys: vec![Jwk {
                kty: "EC".to_string(),
                kid: Some("ec-key".to_string()),
                key_use: Some("sig".to_string()),
                n: None,
                e: None,
            }],
        };
        assert!(set.find_key(None).is_none());
    }
}

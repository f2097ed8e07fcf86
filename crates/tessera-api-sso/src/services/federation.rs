//! Federation flow: redirect out to the corporate identity provider,
//! exchange the callback code, verify the returned identity, and upsert the
//! local user record.

use crate::error::FederationError;
use crate::models::{IdentityClaims, ProviderTokenResponse};
use crate::router::FederationConfig;
use crate::services::{DiscoveryService, JwksClient};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tessera_db::models::{SsoLoginSession, User};
use tessera_db::DbPool;

/// Timeout for every HTTP call to the identity provider. Calls past this
/// fail closed as `FederationError`.
const PROVIDER_HTTP_TIMEOUT_SECS: u64 = 10;

/// The provider authorization URL plus the state bound to it.
#[derive(Debug, Clone)]
pub struct AuthorizeRedirect {
    pub url: String,
    pub state: String,
}

/// Federation service for the single corporate identity provider.
#[derive(Clone)]
pub struct FederationService {
    pool: DbPool,
    config: FederationConfig,
    http: reqwest::Client,
    discovery: DiscoveryService,
    jwks: JwksClient,
}

impl FederationService {
    /// Create a new federation service.
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized; this happens at
    /// startup, before any request is served.
    #[must_use]
    pub fn new(pool: DbPool, config: FederationConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(PROVIDER_HTTP_TIMEOUT_SECS))
            .build()
            .expect("failed to build federation HTTP client");

        Self {
            pool,
            config,
            http: http.clone(),
            discovery: DiscoveryService::new(http.clone()),
            jwks: JwksClient::new(http),
        }
    }

    /// Generate a 32-byte random value, base64url encoded (43 chars).
    fn generate_random_value() -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Compute the S256 PKCE challenge for a verifier.
    fn pkce_challenge(verifier: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(verifier.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }

    /// Validate that `return_to` is a local path, not an absolute URL.
    ///
    /// Keeps the post-login redirect from becoming an open redirector:
    /// only same-origin paths survive; anything else falls back to "/".
    fn sanitize_return_to(return_to: Option<&str>) -> String {
        match return_to {
            Some(p) if p.starts_with('/') && !p.starts_with("//") && !p.contains('\\') => {
                p.to_string()
            }
            _ => "/".to_string(),
        }
    }

    /// Begin a federated login.
    ///
    /// Generates fresh `state`, `nonce` and PKCE material, persists the
    /// login session, and returns the provider authorization URL to
    /// redirect the browser to.
    pub async fn begin_login(
        &self,
        return_to: Option<&str>,
    ) -> Result<AuthorizeRedirect, FederationError> {
        let metadata = self.discovery.discover(&self.config.issuer_url).await?;

        let state = Self::generate_random_value();
        let nonce = Self::generate_random_value();
        let pkce_verifier = Self::generate_random_value();
        let return_to = Self::sanitize_return_to(return_to);

        let session =
            SsoLoginSession::create(&self.pool, &state, &nonce, &pkce_verifier, &return_to)
                .await?;

        let mut auth_url = url::Url::parse(&metadata.authorization_endpoint)
            .map_err(|e| FederationError::DiscoveryFailed(e.to_string()))?;

        {
            let mut query = auth_url.query_pairs_mut();
            query.append_pair("response_type", "code");
            query.append_pair("client_id", &self.config.client_id);
            query.append_pair("redirect_uri", &self.config.callback_url);
            query.append_pair("scope", &self.config.scopes);
            query.append_pair("state", &state);
            query.append_pair("nonce", &nonce);
            query.append_pair("code_challenge", &Self::pkce_challenge(&pkce_verifier));
            query.append_pair("code_challenge_method", "S256");
        }

        tracing::info!(session_id = %session.id, "Initiated federated login");

        Ok(AuthorizeRedirect {
            url: auth_url.to_string(),
            state,
        })
    }

    /// Complete a federated login from the provider callback.
    ///
    /// Consumes the login session by `state` (single atomic winner - a
    /// mismatched, replayed or expired state fails), exchanges the code,
    /// verifies the ID token against the provider's JWKS, validates the
    /// nonce, maps the claims, and upserts the local user.
    ///
    /// Returns the user together with the path to send the browser back to.
    pub async fn complete_login(
        &self,
        code: &str,
        state: &str,
    ) -> Result<(User, String), FederationError> {
        let session = SsoLoginSession::consume_by_state(&self.pool, state)
            .await?
            .ok_or(FederationError::StateMismatch)?;

        let metadata = self.discovery.discover(&self.config.issuer_url).await?;

        let tokens = self
            .exchange_code(&metadata.token_endpoint, code, &session.pkce_verifier)
            .await?;

        let payload = self
            .jwks
            .verify_id_token(
                &tokens.id_token,
                &metadata.jwks_uri,
                &metadata.issuer,
                &self.config.client_id,
            )
            .await?;

        // Bind the ID token to this login session
        let token_nonce = payload.get("nonce").and_then(|v| v.as_str());
        if token_nonce != Some(session.nonce.as_str()) {
            tracing::warn!(
                session_id = %session.id,
                "Nonce mismatch in ID token - possible replay"
            );
            return Err(FederationError::InvalidIdToken("nonce mismatch".to_string()));
        }

        let claims = IdentityClaims::from_payload(&payload)?;
        let user = User::upsert_from_sso(&self.pool, claims.into_upsert()).await?;

        tracing::info!(
            user_id = %user.id,
            sso_id = %user.sso_id,
            "Federated login completed"
        );

        Ok((user, session.return_to))
    }

    /// Exchange the provider's authorization code for tokens.
    async fn exchange_code(
        &self,
        token_endpoint: &str,
        code: &str,
        pkce_verifier: &str,
    ) -> Result<ProviderTokenResponse, FederationError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
            ("redirect_uri", &self.config.callback_url),
            ("code_verifier", pkce_verifier),
        ];

        let response = self
            .http
            .post(token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| FederationError::ExchangeFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            // Provider error bodies go to the log, never to the caller
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Provider token exchange failed"
            );
            return Err(FederationError::ExchangeFailed(format!(
                "token endpoint returned HTTP {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| FederationError::ExchangeFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_values_are_unique_and_sized() {
        let a = FederationService::generate_random_value();
        let b = FederationService::generate_random_value();
        assert_ne!(a, b);
        // 32 bytes base64url encoded = 43 characters
        assert_eq!(a.len(), 43);
    }

    #[test]
    fn test_pkce_challenge_rfc7636_vector() {
        // Test vector from RFC 7636 Appendix B
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        let expected = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";
        assert_eq!(FederationService::pkce_challenge(verifier), expected);
    }

    #[test]
    fn test_sanitize_return_to_accepts_local_paths() {
        assert_eq!(
            FederationService::sanitize_return_to(Some("/oauth/authorize?client_id=x")),
            "/oauth/authorize?client_id=x"
        );
        assert_eq!(FederationService::sanitize_return_to(Some("/")), "/");
    }

    #[test]
    fn test_sanitize_return_to_rejects_external_targets() {
        assert_eq!(
            FederationService::sanitize_return_to(Some("https://evil.example")),
            "/"
        );
        assert_eq!(
            FederationService::sanitize_return_to(Some("//evil.example/path")),
            "/"
        );
        assert_eq!(
            FederationService::sanitize_return_to(Some("/\\evil.example")),
            "/"
        );
        assert_eq!(FederationService::sanitize_return_to(None), "/");
    }
}

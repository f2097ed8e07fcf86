//! OIDC discovery for the corporate identity provider.
//!
//! Fetches `<issuer>/.well-known/openid-configuration` and caches the
//! result. There is exactly one upstream provider per deployment, so the
//! cache is a single entry.

use crate::error::FederationError;
use crate::models::ProviderMetadata;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Metadata cache lifetime.
const METADATA_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Discovery service with a single-entry metadata cache.
#[derive(Clone)]
pub struct DiscoveryService {
    http: reqwest::Client,
    cache: Arc<RwLock<Option<(ProviderMetadata, Instant)>>>,
}

impl DiscoveryService {
    /// Create a new discovery service sharing the federation HTTP client.
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Fetch (or return cached) provider metadata for the issuer.
    pub async fn discover(&self, issuer_url: &str) -> Result<ProviderMetadata, FederationError> {
        {
            let cache = self.cache.read().await;
            if let Some((metadata, fetched_at)) = cache.as_ref() {
                if fetched_at.elapsed() < METADATA_CACHE_TTL {
                    return Ok(metadata.clone());
                }
            }
        }

        let url = format!(
            "{}/.well-known/openid-configuration",
            issuer_url.trim_end_matches('/')
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FederationError::DiscoveryFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FederationError::DiscoveryFailed(format!(
                "discovery endpoint returned HTTP {}",
                response.status()
            )));
        }

        let metadata: ProviderMetadata = response
            .json()
            .await
            .map_err(|e| FederationError::DiscoveryFailed(e.to_string()))?;

        let mut cache = self.cache.write().await;
        *cache = Some((metadata.clone(), Instant::now()));

        tracing::debug!(issuer = %metadata.issuer, "Provider metadata refreshed");
        Ok(metadata)
    }
}

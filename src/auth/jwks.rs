//! Async JWKS fetcher with a TTL cache, grounded on the original ruleset's
//! `AsyncJWKSClient`: a sync JWKS client would block the connection-handling
//! runtime on every cache miss, so this uses `reqwest` instead.

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::JwkSet;
use parking_lot::Mutex;

use crate::error::AuthError;

const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct Cached {
    jwks: JwkSet,
    fetched_at: Instant,
}

pub struct JwksClient {
    url: String,
    ttl: Duration,
    http: reqwest::Client,
    cache: Mutex<Option<Cached>>,
}

impl JwksClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_ttl(url, DEFAULT_TTL)
    }

    pub fn with_ttl(url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            url: url.into(),
            ttl,
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("reqwest client builds with static config"),
            cache: Mutex::new(None),
        }
    }

    /// Returns the signing key matching `kid`, refreshing the cache first if
    /// it's stale or the key isn't present yet (handles key rotation without
    /// waiting out a full TTL).
    pub async fn signing_key_for(self: &Arc<Self>, kid: &str) -> Result<jsonwebtoken::jwk::Jwk, AuthError> {
        if let Some(key) = self.find_cached(kid) {
            return Ok(key);
        }
        self.refresh().await?;
        self.find_cached(kid)
            .ok_or_else(|| AuthError::JwksUnavailable(format!("key {kid} not found in jwks")))
    }

    fn find_cached(&self, kid: &str) -> Option<jsonwebtoken::jwk::Jwk> {
        let guard = self.cache.lock();
        let cached = guard.as_ref()?;
        if cached.fetched_at.elapsed() >= self.ttl {
            return None;
        }
        cached.jwks.keys.iter().find(|k| k.common.key_id.as_deref() == Some(kid)).cloned()
    }

    async fn refresh(&self) -> Result<(), AuthError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AuthError::JwksUnavailable(e.to_string()))?;
        let jwks: JwkSet = response
            .error_for_status()
            .map_err(|e| AuthError::JwksUnavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::JwksUnavailable(e.to_string()))?;
        tracing::debug!(url = %self.url, "jwks cache refreshed");
        *self.cache.lock() = Some(Cached { jwks, fetched_at: Instant::now() });
        Ok(())
    }
}

//! Cached JSON Web Key Set.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::JwkSet;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use super::error::JwksError;

struct KeySet {
    keys: HashMap<String, Arc<DecodingKey>>,
    fetched_at: Instant,
}

/// Issuer public keys, fetched lazily and kept for `refresh`.
///
/// Reads are lock-free. Refetches are serialized so that a burst of tokens
/// with an unknown `kid` results in a single request, and they are spaced at
/// least `min_refresh` apart.
pub struct JwksCache {
    http: reqwest::Client,
    url: Url,
    refresh: Duration,
    min_refresh: Duration,
    current: ArcSwapOption<KeySet>,
    refetch: Mutex<()>,
}

impl JwksCache {
    #[must_use]
    pub fn new(http: reqwest::Client, url: Url, refresh: Duration, min_refresh: Duration) -> Self {
        Self {
            http,
            url,
            refresh,
            min_refresh,
            current: ArcSwapOption::empty(),
            refetch: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Look up the decoding key for `kid`.
    ///
    /// # Errors
    ///
    /// Returns [`JwksError::UnknownKey`] if the issuer does not publish the
    /// key, or a fetch error if the key set is unavailable and no cached copy
    /// holds the key.
    pub async fn key(&self, kid: &str) -> Result<Arc<DecodingKey>, JwksError> {
        if let Some(set) = self.current.load_full()
            && set.fetched_at.elapsed() < self.refresh
            && let Some(key) = set.keys.get(kid)
        {
            return Ok(Arc::clone(key));
        }
        self.refetch_for(kid).await
    }

    /// Fetch the key set now, replacing the cached copy.
    ///
    /// # Errors
    ///
    /// Returns a [`JwksError`] if the fetch fails; the cached copy is kept.
    pub async fn refresh(&self) -> Result<usize, JwksError> {
        let _guard = self.refetch.lock().await;
        let set = self.fetch().await?;
        let count = set.keys.len();
        self.current.store(Some(Arc::new(set)));
        Ok(count)
    }

    async fn refetch_for(&self, kid: &str) -> Result<Arc<DecodingKey>, JwksError> {
        let _guard = self.refetch.lock().await;

        // Another task may have refreshed while we waited.
        let cached = self.current.load_full();
        if let Some(set) = &cached {
            let age = set.fetched_at.elapsed();
            match set.keys.get(kid) {
                Some(key) if age < self.refresh => return Ok(Arc::clone(key)),
                None if age < self.min_refresh => {
                    debug!(kid, "Unknown key id, key set refreshed too recently");
                    return Err(JwksError::UnknownKey(kid.to_owned()));
                }
                _ => {}
            }
        }

        match self.fetch().await {
            Ok(set) => {
                let key = set.keys.get(kid).cloned();
                self.current.store(Some(Arc::new(set)));
                key.ok_or_else(|| JwksError::UnknownKey(kid.to_owned()))
            }
            Err(err) => {
                if let Some(key) = cached.and_then(|set| set.keys.get(kid).cloned()) {
                    warn!(error = %err, "Key set refresh failed, using cached keys");
                    return Ok(key);
                }
                Err(err)
            }
        }
    }

    #[tracing::instrument(skip_all, fields(url = %self.url))]
    async fn fetch(&self) -> Result<KeySet, JwksError> {
        let response = self.http.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(JwksError::Status(status.as_u16()));
        }
        let jwks: JwkSet = response.json().await?;

        let keys: HashMap<String, Arc<DecodingKey>> = jwks
            .keys
            .iter()
            .filter_map(|jwk| {
                let kid = jwk.common.key_id.clone()?;
                match DecodingKey::from_jwk(jwk) {
                    Ok(key) => Some((kid, Arc::new(key))),
                    Err(err) => {
                        warn!(%kid, error = %err, "Skipping unusable key");
                        None
                    }
                }
            })
            .collect();

        if keys.is_empty() {
            return Err(JwksError::Empty);
        }

        info!(keys = keys.len(), "Key set fetched");
        Ok(KeySet {
            keys,
            fetched_at: Instant::now(),
        })
    }
}

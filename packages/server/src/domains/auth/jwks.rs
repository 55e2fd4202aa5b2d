//! TTL-cached view of the identity provider's published signing keys.
//!
//! Lookups take the read lock only. A refetch happens when the set is older
//! than its TTL, or when a token names a key id we have not seen (key
//! rotation); unknown ids trigger at most one refetch per
//! [`UNKNOWN_KID_REFETCH_INTERVAL`]. Concurrent refetches are coalesced
//! behind a mutex: whoever waits on it re-checks the cache before fetching.

use anyhow::{Context, Result};
use async_trait::async_trait;
use jsonwebtoken::jwk::Jwk;
use jsonwebtoken::DecodingKey;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::errors::AuthError;
use crate::kernel::BaseKeySource;

pub const UNKNOWN_KID_REFETCH_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Default)]
struct KeySet {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Option<Instant>,
}

impl KeySet {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.is_some_and(|at| at.elapsed() < ttl)
    }

    fn may_refetch_for_unknown_kid(&self) -> bool {
        self.fetched_at
            .map_or(true, |at| at.elapsed() >= UNKNOWN_KID_REFETCH_INTERVAL)
    }
}

pub struct JwksCache {
    client: reqwest::Client,
    jwks_url: String,
    ttl: Duration,
    state: RwLock<KeySet>,
    refetch: Mutex<()>,
}

impl JwksCache {
    pub fn new(jwks_url: String, ttl: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            jwks_url,
            ttl,
            state: RwLock::new(KeySet::default()),
            refetch: Mutex::new(()),
        })
    }

    async fn fresh_key(&self, kid: &str) -> Option<DecodingKey> {
        let state = self.state.read().await;
        if state.is_fresh(self.ttl) {
            state.keys.get(kid).cloned()
        } else {
            None
        }
    }

    async fn fetch(&self) -> Result<HashMap<String, DecodingKey>, AuthError> {
        debug!(url = %self.jwks_url, "fetching key set");

        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::KeyUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::KeyUnavailable(format!(
                "key set endpoint returned {status}"
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AuthError::KeyUnavailable(format!("malformed key set: {e}")))?;

        Ok(parse_key_set(&body))
    }
}

/// Signing keys by id. Encryption keys and entries that cannot be parsed
/// are skipped rather than failing the whole set.
pub fn parse_key_set(body: &serde_json::Value) -> HashMap<String, DecodingKey> {
    let mut keys = HashMap::new();

    let entries = match body.get("keys").and_then(|k| k.as_array()) {
        Some(entries) => entries,
        None => return keys,
    };

    for entry in entries {
        if entry.get("use").and_then(|u| u.as_str()) == Some("enc") {
            continue;
        }

        let jwk: Jwk = match serde_json::from_value(entry.clone()) {
            Ok(jwk) => jwk,
            Err(e) => {
                warn!(error = %e, "skipping unparsable key");
                continue;
            }
        };
        let Some(kid) = jwk.common.key_id.clone() else {
            continue;
        };

        match DecodingKey::from_jwk(&jwk) {
            Ok(key) => {
                keys.insert(kid, key);
            }
            Err(e) => warn!(kid = %kid, error = %e, "skipping unusable key"),
        }
    }

    keys
}

#[async_trait]
impl BaseKeySource for JwksCache {
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.fresh_key(kid).await {
            return Ok(key);
        }

        let _guard = self.refetch.lock().await;

        {
            let state = self.state.read().await;
            if state.is_fresh(self.ttl) {
                if let Some(key) = state.keys.get(kid) {
                    return Ok(key.clone());
                }
                if !state.may_refetch_for_unknown_kid() {
                    return Err(AuthError::InvalidToken(format!("unknown key id {kid}")));
                }
            }
        }

        let keys = self.fetch().await?;
        info!(count = keys.len(), "key set refreshed");

        let mut state = self.state.write().await;
        state.keys = keys;
        state.fetched_at = Some(Instant::now());

        state
            .keys
            .get(kid)
            .cloned()
            .ok_or_else(|| AuthError::InvalidToken(format!("unknown key id {kid}")))
    }
}

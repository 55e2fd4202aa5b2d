//! Process-wide cache for this service's outbound bearer token.
//!
//! One `CredentialCache` is shared by every outbound client. Reads of a live
//! credential only take the read lock. When the credential is missing or inside
//! its refresh margin, the first caller installs a shared refresh future and
//! every concurrent caller awaits that same future, so a burst of requests
//! against an expired token produces exactly one call to the token endpoint
//! and every waiter sees the same outcome.
//!
//! A failed refresh never touches the cached credential; the next caller
//! simply starts a new refresh.

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::token_client::{CredentialError, TokenResponse};
use super::BaseTokenClient;

/// Credentials are refreshed this long before the identity provider expires them.
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(5);

/// Longer grants are cached for this long only.
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

type RefreshFuture = Shared<BoxFuture<'static, Result<String, CredentialError>>>;

/// A bearer token together with its absolute expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedCredential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedCredential {
    /// Convert the relative `expires_in` of a grant into an absolute expiry,
    /// capped at [`MAX_TOKEN_LIFETIME`].
    pub fn from_response(
        response: TokenResponse,
        received_at: DateTime<Utc>,
    ) -> Result<Self, CredentialError> {
        let seconds = response.expires_in.min(MAX_TOKEN_LIFETIME.as_secs());
        let expires_at = i64::try_from(seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .and_then(|lifetime| received_at.checked_add_signed(lifetime))
            .ok_or_else(|| {
                CredentialError::MalformedResponse(format!(
                    "unrepresentable expires_in {}",
                    response.expires_in
                ))
            })?;

        Ok(Self {
            token: response.access_token,
            expires_at,
        })
    }

    /// Usable only while `now < expires_at - margin`.
    pub fn is_usable(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        let margin = chrono::Duration::from_std(margin).unwrap_or_else(|_| chrono::Duration::zero());
        self.expires_at
            .checked_sub_signed(margin)
            .is_some_and(|usable_until| now < usable_until)
    }
}

#[derive(Default)]
struct CacheState {
    credential: Option<CachedCredential>,
    in_flight: Option<RefreshFuture>,
}

struct Inner {
    client: Arc<dyn BaseTokenClient>,
    refresh_margin: Duration,
    state: RwLock<CacheState>,
}

/// Shared, single-flight cache for the client-credentials token
#[derive(Clone)]
pub struct CredentialCache {
    inner: Arc<Inner>,
}

impl CredentialCache {
    pub fn new(client: Arc<dyn BaseTokenClient>) -> Self {
        Self::with_refresh_margin(client, DEFAULT_REFRESH_MARGIN)
    }

    pub fn with_refresh_margin(client: Arc<dyn BaseTokenClient>, refresh_margin: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                refresh_margin,
                state: RwLock::new(CacheState::default()),
            }),
        }
    }

    /// Return a usable bearer token, refreshing it if necessary.
    pub async fn token(&self) -> Result<String, CredentialError> {
        if let Some(token) = self.cached_token().await {
            return Ok(token);
        }

        let refresh = {
            let mut state = self.inner.state.write().await;

            // Someone else may have finished a refresh while we waited for the lock.
            if let Some(credential) = state.credential.as_ref() {
                if credential.is_usable(Utc::now(), self.inner.refresh_margin) {
                    return Ok(credential.token.clone());
                }
            }

            match &state.in_flight {
                Some(refresh) => {
                    debug!("joining in-flight token refresh");
                    refresh.clone()
                }
                None => {
                    let refresh = Self::refresh(self.inner.clone()).boxed().shared();
                    state.in_flight = Some(refresh.clone());
                    refresh
                }
            }
        };

        refresh.await
    }

    /// The cached credential, if any, regardless of whether it is still usable.
    pub async fn current(&self) -> Option<CachedCredential> {
        self.inner.state.read().await.credential.clone()
    }

    async fn cached_token(&self) -> Option<String> {
        let state = self.inner.state.read().await;
        state
            .credential
            .as_ref()
            .filter(|c| c.is_usable(Utc::now(), self.inner.refresh_margin))
            .map(|c| c.token.clone())
    }

    async fn refresh(inner: Arc<Inner>) -> Result<String, CredentialError> {
        let result = inner.client.request_token().await;

        let mut state = inner.state.write().await;
        state.in_flight = None;

        match result.and_then(|response| CachedCredential::from_response(response, Utc::now())) {
            Ok(credential) => {
                info!(expires_at = %credential.expires_at, "service token refreshed");
                let token = credential.token.clone();
                state.credential = Some(credential);
                Ok(token)
            }
            Err(e) => {
                warn!(error = %e, "service token refresh failed");
                Err(e)
            }
        }
    }
}

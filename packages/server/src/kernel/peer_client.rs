use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::credential_cache::CredentialCache;

/// Authenticated JSON POSTs to peer services.
///
/// Shared plumbing for the warehouse and catalog clients: attach a bearer
/// token from the process-wide [`CredentialCache`], send the body as JSON and
/// report whether the peer answered with a 2xx status.
#[derive(Clone)]
pub struct PeerClient {
    client: reqwest::Client,
    credentials: CredentialCache,
}

impl PeerClient {
    pub fn new(credentials: CredentialCache) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            credentials,
        })
    }

    /// POST `body` to `url`. Any failure (token, transport, non-2xx) is logged
    /// and reported as `false`.
    pub async fn post_json<T>(&self, url: &str, body: &T) -> bool
    where
        T: Serialize + ?Sized,
    {
        let token = match self.credentials.token().await {
            Ok(token) => token,
            Err(e) => {
                warn!(url = %url, error = %e, "no service token for peer call");
                return false;
            }
        };

        let response = match self
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "peer call failed");
                return false;
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!(url = %url, status = %status, "peer call succeeded");
            true
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = %status, body = %body, "peer rejected call");
            false
        }
    }
}

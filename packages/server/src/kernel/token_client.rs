use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::BaseTokenClient;

/// Successful client-credentials grant response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds, relative to the moment the response was received
    pub expires_in: u64,
}

/// Failure to obtain a service credential.
///
/// Clone so one refresh outcome can be handed to every caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Token endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Token endpoint unreachable: {0}")]
    Transport(String),

    #[error("Malformed token response: {0}")]
    MalformedResponse(String),
}

/// OAuth2 client-credentials client for the identity provider's token endpoint
pub struct ClientCredentialsClient {
    token_url: String,
    client_id: String,
    client_secret: String,
    client: reqwest::Client,
}

impl ClientCredentialsClient {
    pub fn new(token_url: String, client_id: String, client_secret: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(5))
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            token_url,
            client_id,
            client_secret,
            client,
        })
    }
}

#[async_trait]
impl BaseTokenClient for ClientCredentialsClient {
    async fn request_token(&self) -> Result<TokenResponse, CredentialError> {
        debug!(
            client_id = %self.client_id,
            token_url = %self.token_url,
            "requesting client-credentials token"
        );

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| CredentialError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "token endpoint rejected request");
            return Err(CredentialError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| CredentialError::MalformedResponse(e.to_string()))
    }
}

use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::errors::AuthError;
use crate::kernel::BaseKeySource;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleSet {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Claims of an access token issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    #[serde(default)]
    pub sub: Option<String>,
    pub iss: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,
    /// Realm-wide roles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm_access: Option<RoleSet>,
    /// Roles per client id
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub resource_access: HashMap<String, RoleSet>,
}

impl AccessClaims {
    /// Role granted either to `client_id` or realm-wide.
    pub fn has_role(&self, client_id: &str, role: &str) -> bool {
        let client_roles = self
            .resource_access
            .get(client_id)
            .map(|set| set.roles.as_slice())
            .unwrap_or_default();
        let realm_roles = self
            .realm_access
            .as_ref()
            .map(|set| set.roles.as_slice())
            .unwrap_or_default();

        client_roles.iter().chain(realm_roles).any(|r| r == role)
    }
}

/// Verifies RS256 access tokens against the published key set
#[derive(Clone)]
pub struct TokenVerifier {
    keys: Arc<dyn BaseKeySource>,
    issuer: String,
}

impl TokenVerifier {
    pub fn new(keys: Arc<dyn BaseKeySource>, issuer: String) -> Self {
        Self { keys, issuer }
    }

    /// Check signature, expiry and issuer; returns the trusted claims.
    pub async fn verify(&self, token: &str) -> Result<AccessClaims, AuthError> {
        let header = decode_header(token)
            .map_err(|e| AuthError::InvalidToken(format!("malformed token: {e}")))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("token has no key id".to_string()))?;

        let key = self.keys.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.validate_aud = false;

        decode::<AccessClaims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

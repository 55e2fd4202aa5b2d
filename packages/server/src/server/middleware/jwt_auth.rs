use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::domains::auth::{AccessClaims, AuthError, TokenVerifier};

/// Cookie carrying the bearer token for browser sessions
pub const AUTH_COOKIE: &str = "auth_token";

/// Verified caller, available to handlers through request extensions
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub claims: AccessClaims,
}

impl AuthContext {
    /// Who is calling, for audit logs
    pub fn actor(&self) -> &str {
        self.claims
            .preferred_username
            .as_deref()
            .or(self.claims.sub.as_deref())
            .unwrap_or("-")
    }
}

/// Outcome of running the gate over one request
pub enum GateDecision {
    Continue(AuthContext),
    Terminate(Response),
}

/// Verifies the bearer credential and the role required for a group of routes
pub struct AuthorizationGate {
    verifier: TokenVerifier,
    client_id: String,
    required_role: String,
    login_path: String,
}

impl AuthorizationGate {
    pub fn new(
        verifier: TokenVerifier,
        client_id: String,
        required_role: String,
        login_path: String,
    ) -> Self {
        Self {
            verifier,
            client_id,
            required_role,
            login_path,
        }
    }

    pub async fn check(&self, method: &Method, headers: &HeaderMap) -> GateDecision {
        let Some(token) = extract_bearer_token(headers) else {
            return if *method == Method::GET || *method == Method::HEAD {
                debug!(login_path = %self.login_path, "no credential, redirecting to login");
                GateDecision::Terminate(
                    (StatusCode::FOUND, [(header::LOCATION, self.login_path.clone())])
                        .into_response(),
                )
            } else {
                GateDecision::Terminate(AuthError::MissingCredential.into_response())
            };
        };

        let claims = match self.verifier.verify(&token).await {
            Ok(claims) => claims,
            Err(e) => {
                info!(error = %e, "rejecting request with unverifiable token");
                return GateDecision::Terminate(e.into_response());
            }
        };

        if !claims.has_role(&self.client_id, &self.required_role) {
            info!(
                subject = claims.sub.as_deref().unwrap_or("-"),
                role = %self.required_role,
                "rejecting request without required role"
            );
            return GateDecision::Terminate(
                AuthError::InsufficientRole(self.required_role.clone()).into_response(),
            );
        }

        GateDecision::Continue(AuthContext { claims })
    }
}

/// Bearer token from the `Authorization` header, else from the auth cookie.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = from_header {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == AUTH_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Authorization middleware
///
/// Runs the gate and either passes the request on with an [`AuthContext`]
/// in its extensions or answers it directly.
pub async fn authorization_gate(
    gate: Arc<AuthorizationGate>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let decision = gate.check(request.method(), request.headers()).await;
    match decision {
        GateDecision::Continue(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        GateDecision::Terminate(response) => response,
    }
}

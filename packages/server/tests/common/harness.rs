//! Router-level test harness.
//!
//! Builds the real axum app over in-memory dependencies, with a wiremock
//! server standing in for the identity provider's key set endpoint.

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use order_core::domains::auth::JwksCache;
use order_core::kernel::TestDependencies;
use order_core::server::{build_app, AuthSettings};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{key_set, rsa_jwk, API_ROLE, CLIENT_ID, ISSUER, KID_A, MANAGER_ROLE, MODULUS_A};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn auth_settings() -> AuthSettings {
    AuthSettings {
        issuer: ISSUER.to_string(),
        client_id: CLIENT_ID.to_string(),
        manager_role: MANAGER_ROLE.to_string(),
        api_role: API_ROLE.to_string(),
        login_path: "/login".to_string(),
    }
}

pub struct TestHarness {
    pub deps: TestDependencies,
    pub app: Router,
    pub idp: MockServer,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_deps(TestDependencies::new()).await
    }

    pub async fn with_deps(deps: TestDependencies) -> Self {
        init_tracing();

        let idp = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/certs"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(key_set(vec![rsa_jwk(KID_A, MODULUS_A)])),
            )
            .mount(&idp)
            .await;

        let keys = JwksCache::new(format!("{}/certs", idp.uri()), Duration::from_secs(3600))
            .unwrap();
        let app = build_app(deps.server_deps(), Arc::new(keys), auth_settings());

        Self { deps, app, idp }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: &Value) -> Response<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn post_form(&self, uri: &str, token: &str, form: &str) -> Response<Body> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.send(request).await
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

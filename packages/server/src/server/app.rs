//! Application setup and router configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::domains::auth::TokenVerifier;
use crate::domains::orders::activities::OrderOrchestrator;
use crate::kernel::{BaseKeySource, ServerDeps};
use crate::server::middleware::{authorization_gate, AuthorizationGate};
use crate::server::routes::{
    confirm_order_handler, credit_standing_handler, health_handler, list_invoices_handler,
    list_orders_handler, order_history_handler, order_status_handler, pay_invoice_handler,
    place_order_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
    pub orchestrator: Arc<OrderOrchestrator>,
}

/// Inbound token checks for the two route groups
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub issuer: String,
    pub client_id: String,
    /// Required for the manager pages (`/orders`, `/invoices`)
    pub manager_role: String,
    /// Required for the JSON API (`/api/...`)
    pub api_role: String,
    pub login_path: String,
}

impl AuthSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            issuer: config.issuer_url.clone(),
            client_id: config.client_id.clone(),
            manager_role: config.order_manager_role.clone(),
            api_role: config.order_api_role.clone(),
            login_path: config.login_path.clone(),
        }
    }
}

/// Build the Axum application router
///
/// `/health` is open; every other route sits behind an authorization gate
/// for its group's role.
pub fn build_app(deps: ServerDeps, keys: Arc<dyn BaseKeySource>, auth: AuthSettings) -> Router {
    let verifier = TokenVerifier::new(keys, auth.issuer.clone());
    let manager_gate = Arc::new(AuthorizationGate::new(
        verifier.clone(),
        auth.client_id.clone(),
        auth.manager_role.clone(),
        auth.login_path.clone(),
    ));
    let api_gate = Arc::new(AuthorizationGate::new(
        verifier,
        auth.client_id,
        auth.api_role,
        auth.login_path,
    ));

    let app_state = AppState {
        orchestrator: Arc::new(OrderOrchestrator::new(&deps)),
        deps: Arc::new(deps),
    };

    let manager_routes = Router::new()
        .route("/orders", get(list_orders_handler))
        .route("/orders/confirm", post(confirm_order_handler))
        .route("/invoices", get(list_invoices_handler).post(pay_invoice_handler))
        .layer(middleware::from_fn(move |req, next| {
            authorization_gate(manager_gate.clone(), req, next)
        }));

    let api_routes = Router::new()
        .route("/api/orders", post(place_order_handler).get(order_history_handler))
        .route("/api/orders/status", post(order_status_handler))
        .route("/api/customers/credit", get(credit_standing_handler))
        .layer(middleware::from_fn(move |req, next| {
            authorization_gate(api_gate.clone(), req, next)
        }));

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .merge(manager_routes)
        .merge(api_routes)
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

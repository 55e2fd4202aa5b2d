use axum::{
    body::Bytes,
    extract::{Extension, Form, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::info;

use super::{form_id, found};
use crate::common::DataAccessError;
use crate::domains::orders::activities::{confirm_order, update_order_status};
use crate::domains::orders::data::{PlaceOrderRequest, StatusUpdateRequest};
use crate::domains::orders::models::Order;
use crate::domains::orders::OrderError;
use crate::server::app::AppState;
use crate::server::middleware::AuthContext;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub customer: Option<String>,
}

fn parse_json<T: serde::de::DeserializeOwned>(body: &Bytes) -> Result<T, OrderError> {
    serde_json::from_slice(body)
        .map_err(|e| OrderError::Validation(format!("malformed request body: {e}")))
}

/// POST /api/orders
pub async fn place_order_handler(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Result<Response, OrderError> {
    let request: PlaceOrderRequest = parse_json(&body)?;
    let placed = state.orchestrator.place_order(request).await?;
    Ok((StatusCode::CREATED, Json(placed)).into_response())
}

/// GET /api/orders?customer=<name>
pub async fn order_history_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<Order>>, OrderError> {
    let orders = match query.customer.as_deref() {
        Some(customer) => state.deps.orders.find_by_customer(customer).await,
        None => state.deps.orders.find_all().await,
    }
    .map_err(DataAccessError::from)?;

    Ok(Json(orders))
}

/// POST /api/orders/status
pub async fn order_status_handler(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Result<Response, OrderError> {
    let request: StatusUpdateRequest = parse_json(&body)?;
    update_order_status(request, &state.deps).await?;
    Ok(Json(json!({ "status": "updated" })).into_response())
}

/// GET /orders
pub async fn list_orders_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<Order>>, OrderError> {
    let orders = state
        .deps
        .orders
        .find_all()
        .await
        .map_err(DataAccessError::from)?;
    Ok(Json(orders))
}

/// POST /orders/confirm
pub async fn confirm_order_handler(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthContext>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, OrderError> {
    let id = form_id(&form)?;
    let invoice = confirm_order(id, &state.deps).await?;
    info!(order_id = id, invoice_id = invoice.id, actor = auth.actor(), "order confirmed by manager");
    Ok(found("/orders"))
}

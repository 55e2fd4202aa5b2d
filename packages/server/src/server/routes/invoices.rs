use axum::{
    extract::{Extension, Form},
    response::Response,
    Json,
};
use std::collections::HashMap;
use tracing::info;

use super::{form_id, found};
use crate::common::DataAccessError;
use crate::domains::invoices::activities::mark_invoice_paid;
use crate::domains::invoices::models::Invoice;
use crate::domains::orders::OrderError;
use crate::server::app::AppState;
use crate::server::middleware::AuthContext;

/// GET /invoices
pub async fn list_invoices_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<Invoice>>, OrderError> {
    let invoices = state
        .deps
        .invoices
        .find_all()
        .await
        .map_err(DataAccessError::from)?;
    Ok(Json(invoices))
}

/// POST /invoices (form field `id`)
pub async fn pay_invoice_handler(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthContext>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, OrderError> {
    let id = form_id(&form)?;
    let invoice = mark_invoice_paid(id, &state.deps).await?;
    info!(invoice_id = id, order_id = invoice.order_id, actor = auth.actor(), "invoice marked paid");
    Ok(found("/invoices"))
}

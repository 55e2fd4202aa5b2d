use axum::extract::{Extension, Query};
use axum::Json;
use serde::Deserialize;

use crate::domains::invoices::{CreditEvaluator, CreditStanding};
use crate::domains::orders::OrderError;
use crate::server::app::AppState;

#[derive(Debug, Deserialize)]
pub struct CreditQuery {
    pub customer: Option<String>,
}

/// GET /api/customers/credit?customer=<name>
pub async fn credit_standing_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<CreditQuery>,
) -> Result<Json<CreditStanding>, OrderError> {
    let customer = query
        .customer
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| OrderError::Validation("customer is required".to_string()))?;

    let standing = CreditEvaluator::new(state.deps.invoices.clone())
        .standing(&customer)
        .await?;
    Ok(Json(standing))
}

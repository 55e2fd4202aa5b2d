use tracing::info;

use crate::common::DataAccessError;
use crate::domains::orders::data::StatusUpdateRequest;
use crate::domains::orders::errors::OrderError;
use crate::domains::orders::models::OrderStatus;
use crate::kernel::ServerDeps;

/// Apply a status reported by the warehouse (e.g. SHIPPED, DELIVERED).
pub async fn update_order_status(
    request: StatusUpdateRequest,
    deps: &ServerDeps,
) -> Result<OrderStatus, OrderError> {
    let order_id = request
        .order_id
        .ok_or_else(|| OrderError::Validation("orderId is required".to_string()))?;
    let status: OrderStatus = request
        .status
        .ok_or_else(|| OrderError::Validation("status is required".to_string()))?
        .parse()
        .map_err(|e: anyhow::Error| OrderError::Validation(e.to_string()))?;

    let updated = deps
        .orders
        .update_status(order_id, status)
        .await
        .map_err(DataAccessError::from)?;
    if !updated {
        return Err(OrderError::NotFound {
            entity: "Order",
            id: order_id,
        });
    }

    info!(order_id, status = %status, "order status updated");
    Ok(status)
}

use chrono::{Duration, NaiveDate, Utc};
use tracing::{error, info};

use crate::common::DataAccessError;
use crate::domains::invoices::models::{Invoice, NewInvoice};
use crate::domains::orders::errors::OrderError;
use crate::domains::orders::models::OrderStatus;
use crate::kernel::ServerDeps;

/// Days a customer has to pay a confirmed order
pub const PAYMENT_TERM_DAYS: i64 = 30;

/// Confirm a PENDING order and bill it.
pub async fn confirm_order(order_id: i32, deps: &ServerDeps) -> Result<Invoice, OrderError> {
    confirm_order_on(order_id, Utc::now().date_naive(), deps).await
}

/// Only PENDING orders can be confirmed, so each order is billed once. The
/// status flip is a compare-and-set; if the invoice cannot be written the
/// order goes back to PENDING.
pub async fn confirm_order_on(
    order_id: i32,
    today: NaiveDate,
    deps: &ServerDeps,
) -> Result<Invoice, OrderError> {
    let order = deps
        .orders
        .find_by_id(order_id)
        .await
        .map_err(DataAccessError::from)?
        .ok_or(OrderError::NotFound {
            entity: "Order",
            id: order_id,
        })?;

    let not_pending = |status: OrderStatus| {
        OrderError::Conflict(format!(
            "Order {order_id} is {status}; only PENDING orders can be confirmed"
        ))
    };
    if order.status != OrderStatus::Pending {
        return Err(not_pending(order.status));
    }

    let claimed = deps
        .orders
        .transition_status(order.id, OrderStatus::Pending, OrderStatus::Confirmed)
        .await
        .map_err(DataAccessError::from)?;
    if !claimed {
        // Lost a race with another confirmation or a status update
        return Err(not_pending(OrderStatus::Confirmed));
    }

    let created = deps
        .invoices
        .create(NewInvoice {
            order_id: order.id,
            customer_name: order.customer_name.clone(),
            amount: order.total_amount,
            due_date: today + Duration::days(PAYMENT_TERM_DAYS),
        })
        .await;

    let invoice = match created {
        Ok(invoice) => invoice,
        Err(e) => {
            error!(order_id, error = %e, "failed to bill confirmed order, reverting to PENDING");
            if let Err(revert) = deps
                .orders
                .transition_status(order.id, OrderStatus::Confirmed, OrderStatus::Pending)
                .await
            {
                error!(order_id, error = %revert, "failed to revert order status");
            }
            return Err(DataAccessError::from(e).into());
        }
    };

    info!(order_id, invoice_id = invoice.id, due_date = %invoice.due_date, "order confirmed");
    Ok(invoice)
}

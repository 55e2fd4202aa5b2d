use tracing::{info, warn};

use crate::common::DataAccessError;
use crate::domains::invoices::models::Invoice;
use crate::domains::orders::errors::OrderError;
use crate::domains::orders::models::OrderStatus;
use crate::kernel::ServerDeps;

/// Mark an invoice paid and move its order to PAID.
pub async fn mark_invoice_paid(invoice_id: i32, deps: &ServerDeps) -> Result<Invoice, OrderError> {
    let mut invoice = deps
        .invoices
        .find_by_id(invoice_id)
        .await
        .map_err(DataAccessError::from)?
        .ok_or(OrderError::NotFound {
            entity: "Invoice",
            id: invoice_id,
        })?;

    if !deps
        .invoices
        .mark_paid(invoice_id)
        .await
        .map_err(DataAccessError::from)?
    {
        return Err(OrderError::NotFound {
            entity: "Invoice",
            id: invoice_id,
        });
    }
    invoice.paid = true;

    let order_updated = deps
        .orders
        .update_status(invoice.order_id, OrderStatus::Paid)
        .await
        .map_err(DataAccessError::from)?;
    if order_updated {
        info!(invoice_id, order_id = invoice.order_id, "invoice paid");
    } else {
        warn!(invoice_id, order_id = invoice.order_id, "paid invoice references missing order");
    }

    Ok(invoice)
}

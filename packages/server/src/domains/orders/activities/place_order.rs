//! Order placement pipeline.
//!
//! validate -> check_credit -> reserve_stock -> persist -> notify
//!
//! The first three stages are gates: any failure ends the request before an
//! order row exists. Stock that was already reserved when a later stage fails
//! is handed back through the warehouse release endpoint. Once reservations
//! start, the rest of the pipeline runs on its own task, so a client that
//! disconnects mid-request cannot strand reserved stock. Notification runs
//! detached from the request and only logs its outcome.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::common::DataAccessError;
use crate::domains::invoices::CreditEvaluator;
use crate::domains::orders::data::{PlaceOrderRequest, PlacedOrder, ValidatedOrder};
use crate::domains::orders::errors::OrderError;
use crate::domains::orders::models::{NewOrder, Order, OrderItem, OrderStatus};
use crate::kernel::{BaseFulfillmentNotifier, BaseOrderRepository, BaseStockReservation, ServerDeps};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReservationOutcome {
    Reserved,
    Refused,
    TimedOut,
    Cancelled,
}

#[derive(Clone)]
pub struct OrderOrchestrator {
    credit: CreditEvaluator,
    orders: Arc<dyn BaseOrderRepository>,
    stock: Arc<dyn BaseStockReservation>,
    fulfillment: Arc<dyn BaseFulfillmentNotifier>,
    reservation_timeout: Duration,
}

impl OrderOrchestrator {
    pub fn new(deps: &ServerDeps) -> Self {
        Self {
            credit: CreditEvaluator::new(deps.invoices.clone()),
            orders: deps.orders.clone(),
            stock: deps.stock.clone(),
            fulfillment: deps.fulfillment.clone(),
            reservation_timeout: deps.reservation_timeout,
        }
    }

    /// Run the whole pipeline for one request.
    pub async fn place_order(&self, request: PlaceOrderRequest) -> Result<PlacedOrder, OrderError> {
        let order = validate(request)?;
        self.check_credit(&order).await?;

        let pipeline = self.clone();
        let stored = tokio::spawn(async move {
            let reserved = pipeline.reserve_stock(&order.items).await?;
            let stored = pipeline.persist(&order, &reserved).await?;
            pipeline.notify(stored.id);
            Ok::<_, OrderError>(stored)
        })
        .await
        .map_err(|e| {
            error!(error = %e, "order pipeline task failed");
            OrderError::Upstream(e.to_string())
        })??;

        Ok(PlacedOrder {
            order_id: stored.id,
            status: stored.status,
        })
    }

    pub async fn check_credit(&self, order: &ValidatedOrder) -> Result<(), OrderError> {
        if self.credit.check_credit_limit(&order.customer_name).await? {
            Ok(())
        } else {
            info!(customer = %order.customer_name, "order rejected: credit limit exceeded");
            Err(OrderError::CreditRejected)
        }
    }

    /// Reserve every line item concurrently.
    ///
    /// Each reservation is bounded by the configured timeout, and a timeout
    /// counts as a refusal. The first refusal cancels the siblings that are
    /// still waiting. On failure, whatever was reserved is released before
    /// the error is returned; on success the reserved items are returned.
    pub async fn reserve_stock(&self, items: &[OrderItem]) -> Result<Vec<OrderItem>, OrderError> {
        let cancel = CancellationToken::new();
        let mut tasks = JoinSet::new();

        for item in items.iter().copied() {
            let stock = self.stock.clone();
            let cancel = cancel.clone();
            let timeout = self.reservation_timeout;

            tasks.spawn(async move {
                let outcome = tokio::select! {
                    _ = cancel.cancelled() => ReservationOutcome::Cancelled,
                    result = tokio::time::timeout(timeout, stock.reserve(item.product_id, item.quantity)) => {
                        match result {
                            Ok(true) => ReservationOutcome::Reserved,
                            Ok(false) => ReservationOutcome::Refused,
                            Err(_) => ReservationOutcome::TimedOut,
                        }
                    }
                };
                (item, outcome)
            });
        }

        let mut reserved = Vec::with_capacity(items.len());
        let mut failure: Option<OrderError> = None;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((item, ReservationOutcome::Reserved)) => reserved.push(item),
                Ok((item, ReservationOutcome::Refused)) | Ok((item, ReservationOutcome::TimedOut)) => {
                    warn!(product_id = item.product_id, quantity = item.quantity, "stock reservation failed");
                    if failure.is_none() {
                        failure = Some(OrderError::StockUnavailable {
                            product_id: item.product_id,
                        });
                        cancel.cancel();
                    }
                }
                Ok((item, ReservationOutcome::Cancelled)) => {
                    debug!(product_id = item.product_id, "reservation abandoned");
                }
                Err(e) => {
                    error!(error = %e, "reservation task failed");
                    if failure.is_none() {
                        failure = Some(OrderError::Upstream(e.to_string()));
                        cancel.cancel();
                    }
                }
            }
        }

        match failure {
            Some(err) => {
                self.release(&reserved).await;
                Err(err)
            }
            None => Ok(reserved),
        }
    }

    /// Store the order as PENDING. Releases the reservations if the write fails.
    pub async fn persist(
        &self,
        order: &ValidatedOrder,
        reserved: &[OrderItem],
    ) -> Result<Order, OrderError> {
        let new_order = NewOrder {
            customer_name: order.customer_name.clone(),
            status: OrderStatus::Pending,
            total_amount: order.total_amount,
            points_redeemed: order.points_redeemed,
            items: order.items.clone(),
        };

        match self.orders.create(new_order).await {
            Ok(stored) => {
                info!(order_id = stored.id, customer = %stored.customer_name, "order placed");
                Ok(stored)
            }
            Err(e) => {
                error!(error = %e, customer = %order.customer_name, "failed to persist order");
                self.release(reserved).await;
                Err(DataAccessError::from(e).into())
            }
        }
    }

    /// Tell the warehouse the order is ready, without holding up the caller.
    pub fn notify(&self, order_id: i32) -> JoinHandle<()> {
        let fulfillment = self.fulfillment.clone();
        tokio::spawn(async move {
            if fulfillment.notify_order_ready(order_id).await {
                debug!(order_id, "fulfillment notified");
            } else {
                warn!(order_id, "fulfillment notification failed");
            }
        })
    }

    async fn release(&self, items: &[OrderItem]) {
        if items.is_empty() {
            return;
        }
        info!(count = items.len(), "releasing reserved stock");

        let releases = items
            .iter()
            .map(|item| self.stock.release(item.product_id, item.quantity));
        for (item, released) in items.iter().zip(join_all(releases).await) {
            if !released {
                warn!(
                    product_id = item.product_id,
                    quantity = item.quantity,
                    "stock release failed; needs manual reconciliation"
                );
            }
        }
    }
}

/// Check the request shape and normalise it.
pub fn validate(request: PlaceOrderRequest) -> Result<ValidatedOrder, OrderError> {
    let customer_name = request
        .customer_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| OrderError::Validation("customerName is required".to_string()))?;

    if request.items.is_empty() {
        return Err(OrderError::Validation(
            "at least one item is required".to_string(),
        ));
    }

    let items = request
        .items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let product_id = item.product_id.ok_or_else(|| {
                OrderError::Validation(format!("items[{index}].productId is required"))
            })?;
            match item.quantity {
                Some(quantity) if quantity > 0 => Ok(OrderItem {
                    product_id,
                    quantity,
                }),
                _ => Err(OrderError::Validation(format!(
                    "items[{index}].quantity must be positive"
                ))),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let total_amount = request.total_amount.unwrap_or(0.0);
    if !total_amount.is_finite() || total_amount < 0.0 {
        return Err(OrderError::Validation(
            "totalAmount must not be negative".to_string(),
        ));
    }

    let points_redeemed = request.points_to_redeem.unwrap_or(0);
    if points_redeemed < 0 {
        return Err(OrderError::Validation(
            "pointsToRedeem must not be negative".to_string(),
        ));
    }

    Ok(ValidatedOrder {
        customer_name,
        items,
        total_amount,
        points_redeemed,
    })
}

// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (credit rules, the order pipeline) lives in domain code that
// receives these traits through constructors, so tests substitute fakes
// through the same seams production wiring uses.
//
// Naming convention: Base* for trait names (e.g., BaseTokenClient, BaseOrderRepository)

use anyhow::Result;
use async_trait::async_trait;
use jsonwebtoken::DecodingKey;

use super::catalog_sync_client::ProductSnapshot;
use super::token_client::{CredentialError, TokenResponse};
use crate::domains::auth::AuthError;
use crate::domains::invoices::models::{Invoice, NewInvoice};
use crate::domains::orders::models::{NewOrder, Order, OrderStatus};

// =============================================================================
// Identity provider (outbound credentials)
// =============================================================================

#[async_trait]
pub trait BaseTokenClient: Send + Sync {
    /// Perform one client-credentials grant against the token endpoint.
    async fn request_token(&self) -> Result<TokenResponse, CredentialError>;
}

// =============================================================================
// Identity provider (inbound verification keys)
// =============================================================================

#[async_trait]
pub trait BaseKeySource: Send + Sync {
    /// Resolve the public key published under `kid`.
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError>;
}

// =============================================================================
// Warehouse peers
// =============================================================================

/// Outbound calls report success/failure only. Transport errors, token
/// failures and non-2xx responses all collapse into `false`; the details are
/// in the logs.
#[async_trait]
pub trait BaseStockReservation: Send + Sync {
    async fn reserve(&self, product_id: i32, quantity: i32) -> bool;

    /// Give back stock reserved earlier for an order that did not go through.
    async fn release(&self, product_id: i32, quantity: i32) -> bool;
}

#[async_trait]
pub trait BaseFulfillmentNotifier: Send + Sync {
    async fn notify_order_ready(&self, order_id: i32) -> bool;
}

#[async_trait]
pub trait BaseCatalogSync: Send + Sync {
    async fn sync_product(&self, product: &ProductSnapshot) -> bool;
}

// =============================================================================
// Persistence
// =============================================================================

#[async_trait]
pub trait BaseOrderRepository: Send + Sync {
    /// Insert the order and its line items atomically, returning the stored row.
    async fn create(&self, order: NewOrder) -> Result<Order>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Order>>;

    /// All orders, newest first.
    async fn find_all(&self) -> Result<Vec<Order>>;

    async fn find_by_customer(&self, customer_name: &str) -> Result<Vec<Order>>;

    /// Returns false when no order has this id.
    async fn update_status(&self, id: i32, status: OrderStatus) -> Result<bool>;

    /// Move the order from `from` to `to` only if it is still in `from`.
    /// Returns false when the order is missing or in another status.
    async fn transition_status(&self, id: i32, from: OrderStatus, to: OrderStatus) -> Result<bool>;

    /// Cheap liveness probe for the health endpoint.
    async fn ping(&self) -> Result<()>;
}

#[async_trait]
pub trait BaseInvoiceRepository: Send + Sync {
    async fn create(&self, invoice: NewInvoice) -> Result<Invoice>;

    async fn find_by_customer(&self, customer_name: &str) -> Result<Vec<Invoice>>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Invoice>>;

    async fn find_all(&self) -> Result<Vec<Invoice>>;

    /// Returns false when no invoice has this id.
    async fn mark_paid(&self, id: i32) -> Result<bool>;
}

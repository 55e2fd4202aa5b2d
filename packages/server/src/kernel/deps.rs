//! Server dependencies for domain activities (using traits for testability)
//!
//! This is the central dependency container handed to every activity. All
//! external services sit behind `Base*` traits so tests can swap in the fakes
//! from `test_dependencies`.

use anyhow::Result;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use super::catalog_sync_client::CatalogSyncClient;
use super::credential_cache::CredentialCache;
use super::fulfillment_client::FulfillmentClient;
use super::peer_client::PeerClient;
use super::stock_client::StockReservationClient;
use super::token_client::ClientCredentialsClient;
use super::{
    BaseCatalogSync, BaseFulfillmentNotifier, BaseInvoiceRepository, BaseOrderRepository,
    BaseStockReservation,
};
use crate::config::Config;
use crate::domains::invoices::models::PostgresInvoiceRepository;
use crate::domains::orders::models::PostgresOrderRepository;

#[derive(Clone)]
pub struct ServerDeps {
    pub orders: Arc<dyn BaseOrderRepository>,
    pub invoices: Arc<dyn BaseInvoiceRepository>,
    pub stock: Arc<dyn BaseStockReservation>,
    pub fulfillment: Arc<dyn BaseFulfillmentNotifier>,
    pub catalog: Arc<dyn BaseCatalogSync>,
    /// Upper bound on a single stock reservation call
    pub reservation_timeout: Duration,
}

impl ServerDeps {
    pub fn new(
        orders: Arc<dyn BaseOrderRepository>,
        invoices: Arc<dyn BaseInvoiceRepository>,
        stock: Arc<dyn BaseStockReservation>,
        fulfillment: Arc<dyn BaseFulfillmentNotifier>,
        catalog: Arc<dyn BaseCatalogSync>,
        reservation_timeout: Duration,
    ) -> Self {
        Self {
            orders,
            invoices,
            stock,
            fulfillment,
            catalog,
            reservation_timeout,
        }
    }

    /// Production wiring: Postgres repositories and HTTP peer clients that
    /// share one credential cache.
    pub fn from_config(config: &Config, pool: PgPool) -> Result<Self> {
        let token_client = ClientCredentialsClient::new(
            config.token_url.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
        )?;
        let credentials = CredentialCache::new(Arc::new(token_client));
        let peer = PeerClient::new(credentials)?;

        Ok(Self::new(
            Arc::new(PostgresOrderRepository::new(pool.clone())),
            Arc::new(PostgresInvoiceRepository::new(pool)),
            Arc::new(StockReservationClient::new(
                peer.clone(),
                config.warehouse_reserve_url.clone(),
                config.warehouse_release_url.clone(),
            )),
            Arc::new(FulfillmentClient::new(
                peer.clone(),
                config.warehouse_fulfillment_url.clone(),
            )),
            Arc::new(CatalogSyncClient::new(peer, config.catalog_sync_url.clone())),
            config.reservation_timeout,
        ))
    }
}

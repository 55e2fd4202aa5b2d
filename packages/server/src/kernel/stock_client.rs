use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use super::peer_client::PeerClient;
use super::BaseStockReservation;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StockRequest {
    product_id: i32,
    quantity: i32,
}

/// Warehouse stock reservation client
pub struct StockReservationClient {
    peer: PeerClient,
    reserve_url: String,
    release_url: String,
}

impl StockReservationClient {
    pub fn new(peer: PeerClient, reserve_url: String, release_url: String) -> Self {
        Self {
            peer,
            reserve_url,
            release_url,
        }
    }
}

#[async_trait]
impl BaseStockReservation for StockReservationClient {
    async fn reserve(&self, product_id: i32, quantity: i32) -> bool {
        info!(product_id, quantity, "reserving stock");
        self.peer
            .post_json(&self.reserve_url, &StockRequest { product_id, quantity })
            .await
    }

    async fn release(&self, product_id: i32, quantity: i32) -> bool {
        info!(product_id, quantity, "releasing reserved stock");
        self.peer
            .post_json(&self.release_url, &StockRequest { product_id, quantity })
            .await
    }
}

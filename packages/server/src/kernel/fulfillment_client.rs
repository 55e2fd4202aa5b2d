use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use super::peer_client::PeerClient;
use super::BaseFulfillmentNotifier;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FulfillmentRequest {
    order_id: i32,
}

/// Notifies the warehouse that an order is ready for processing
pub struct FulfillmentClient {
    peer: PeerClient,
    fulfillment_url: String,
}

impl FulfillmentClient {
    pub fn new(peer: PeerClient, fulfillment_url: String) -> Self {
        Self {
            peer,
            fulfillment_url,
        }
    }
}

#[async_trait]
impl BaseFulfillmentNotifier for FulfillmentClient {
    async fn notify_order_ready(&self, order_id: i32) -> bool {
        info!(order_id, url = %self.fulfillment_url, "notifying fulfillment");
        self.peer
            .post_json(&self.fulfillment_url, &FulfillmentRequest { order_id })
            .await
    }
}

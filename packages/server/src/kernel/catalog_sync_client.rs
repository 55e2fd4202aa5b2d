use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use super::peer_client::PeerClient;
use super::BaseCatalogSync;

/// Product as published to downstream catalogs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSnapshot {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub unit: String,
    /// Variant attributes (e.g. color, size), folded into the published name
    #[serde(default, skip_serializing)]
    pub attributes: BTreeMap<String, String>,
}

impl ProductSnapshot {
    /// Downstream systems have no notion of variants, so the variant's
    /// attribute values are appended to the base name: "Shirt - Blue L".
    pub fn display_name(&self) -> String {
        if self.attributes.is_empty() {
            return self.name.clone();
        }
        let suffix = self
            .attributes
            .values()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        format!("{} - {}", self.name, suffix)
    }

    fn published(&self) -> Self {
        Self {
            name: self.display_name(),
            attributes: BTreeMap::new(),
            ..self.clone()
        }
    }
}

/// Pushes product snapshots to a peer catalog (webshop or warehouse)
pub struct CatalogSyncClient {
    peer: PeerClient,
    sync_url: String,
}

impl CatalogSyncClient {
    pub fn new(peer: PeerClient, sync_url: String) -> Self {
        Self { peer, sync_url }
    }
}

#[async_trait]
impl BaseCatalogSync for CatalogSyncClient {
    async fn sync_product(&self, product: &ProductSnapshot) -> bool {
        info!(product_id = product.id, url = %self.sync_url, "syncing product");
        self.peer.post_json(&self.sync_url, &product.published()).await
    }
}

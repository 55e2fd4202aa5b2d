//! Kernel module - infrastructure shared by the domains.

pub mod catalog_sync_client;
pub mod credential_cache;
pub mod deps;
pub mod fulfillment_client;
pub mod peer_client;
pub mod stock_client;
pub mod test_dependencies;
pub mod token_client;
pub mod traits;

pub use catalog_sync_client::{CatalogSyncClient, ProductSnapshot};
pub use credential_cache::{CachedCredential, CredentialCache, DEFAULT_REFRESH_MARGIN};
pub use deps::ServerDeps;
pub use fulfillment_client::FulfillmentClient;
pub use peer_client::PeerClient;
pub use stock_client::StockReservationClient;
pub use test_dependencies::TestDependencies;
pub use token_client::{ClientCredentialsClient, CredentialError, TokenResponse};
pub use traits::*;

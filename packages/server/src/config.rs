use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

const DEFAULT_TOKEN_URL: &str =
    "http://keycloak:8080/realms/webshop-realm/protocol/openid-connect/token";
const DEFAULT_JWKS_URL: &str =
    "http://keycloak:8080/realms/webshop-realm/protocol/openid-connect/certs";
const DEFAULT_ISSUER_URL: &str = "https://localhost:8446/realms/webshop-realm";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,

    // Outbound service credentials (client-credentials grant)
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,

    // Inbound verification
    pub jwks_url: String,
    pub issuer_url: String,
    pub jwks_cache_ttl: Duration,
    pub order_manager_role: String,
    pub order_api_role: String,
    pub login_path: String,

    // Warehouse peers
    pub warehouse_reserve_url: String,
    pub warehouse_release_url: String,
    pub warehouse_fulfillment_url: String,
    pub catalog_sync_url: String,
    pub reservation_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8003".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            token_url: var_or("TOKEN_URL", DEFAULT_TOKEN_URL),
            client_id: var_or("CLIENT_ID", "order-client"),
            client_secret: var_or("CLIENT_SECRET", "order-secret"),
            jwks_url: var_or("JWKS_URL", DEFAULT_JWKS_URL),
            issuer_url: var_or("ISSUER_URL", DEFAULT_ISSUER_URL),
            jwks_cache_ttl: Duration::from_secs(
                var_or("JWKS_CACHE_TTL_SECS", "3600")
                    .parse()
                    .context("JWKS_CACHE_TTL_SECS must be a number of seconds")?,
            ),
            order_manager_role: var_or("ORDER_MANAGER_ROLE", "order-manager"),
            order_api_role: var_or("ORDER_API_ROLE", "order-history"),
            login_path: var_or("LOGIN_PATH", "/login"),
            warehouse_reserve_url: var_or(
                "WAREHOUSE_RESERVE_URL",
                "http://warehouse-demo:8002/api/stock/reserve",
            ),
            warehouse_release_url: var_or(
                "WAREHOUSE_RELEASE_URL",
                "http://warehouse-demo:8002/api/stock/release",
            ),
            warehouse_fulfillment_url: var_or(
                "WAREHOUSE_FULFILLMENT_URL",
                "http://warehouse-demo:8002/api/fulfillment/order",
            ),
            catalog_sync_url: var_or(
                "CATALOG_SYNC_URL",
                "http://warehouse-demo:8002/api/products/sync",
            ),
            reservation_timeout: Duration::from_millis(
                var_or("RESERVATION_TIMEOUT_MS", "5000")
                    .parse()
                    .context("RESERVATION_TIMEOUT_MS must be a number of milliseconds")?,
            ),
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

// Webshop Order Service - Order Core
//
// This crate places customer orders against the warehouse and billing peers.
// Outbound calls carry a client-credentials bearer token from a shared,
// single-flight credential cache; inbound calls are gated by JWT verification
// against the identity provider's published key set.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;

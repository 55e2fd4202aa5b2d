//! Wire shapes for the order endpoints.
//!
//! Request fields are optional at the serde level so that a missing field
//! becomes a precise validation message instead of a generic parse error.

use serde::{Deserialize, Serialize};

use super::models::{OrderItem, OrderStatus};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: Option<i32>,
    pub quantity: Option<i32>,
}

/// Body of `POST /api/orders`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub customer_name: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    pub total_amount: Option<f64>,
    pub points_to_redeem: Option<i32>,
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOrder {
    pub customer_name: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub points_redeemed: i32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order_id: i32,
    pub status: OrderStatus,
}

/// Body of `POST /api/orders/status`, sent by the warehouse
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub order_id: Option<i32>,
    pub status: Option<String>,
}

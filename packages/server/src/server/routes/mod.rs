// HTTP routes
pub mod credit;
pub mod health;
pub mod invoices;
pub mod orders;

pub use credit::*;
pub use health::*;
pub use invoices::*;
pub use orders::*;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::collections::HashMap;

use crate::domains::orders::OrderError;

/// 302 to `location`, as the manager pages expect after a form post
fn found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Numeric `id` field of a submitted form
fn form_id(form: &HashMap<String, String>) -> Result<i32, OrderError> {
    form.get("id")
        .and_then(|id| id.trim().parse().ok())
        .ok_or_else(|| OrderError::Validation("form field id must be a number".to_string()))
}

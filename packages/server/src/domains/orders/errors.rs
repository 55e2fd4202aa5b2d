use thiserror::Error;

use crate::common::DataAccessError;

/// Why an order operation did not go through
#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Invalid order request: {0}")]
    Validation(String),

    #[error("Credit limit exceeded")]
    CreditRejected,

    #[error("Stock unavailable for product {product_id}")]
    StockUnavailable { product_id: i32 },

    #[error("Peer service failed: {0}")]
    Upstream(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error(transparent)]
    DataAccess(#[from] DataAccessError),
}

impl OrderError {
    /// Machine-readable reason for business rejections; `None` for faults.
    pub fn rejection_reason(&self) -> Option<&'static str> {
        match self {
            OrderError::CreditRejected => Some("credit_limit_exceeded"),
            OrderError::StockUnavailable { .. } => Some("stock_unavailable"),
            _ => None,
        }
    }
}

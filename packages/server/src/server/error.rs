//! HTTP mapping for domain errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::domains::auth::AuthError;
use crate::domains::orders::OrderError;

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        if let Some(reason) = self.rejection_reason() {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "status": "REJECTED",
                    "reason": reason,
                    "message": self.to_string(),
                })),
            )
                .into_response();
        }

        let status = match &self {
            OrderError::Validation(_) => StatusCode::BAD_REQUEST,
            OrderError::NotFound { .. } => StatusCode::NOT_FOUND,
            OrderError::Conflict(_) => StatusCode::CONFLICT,
            OrderError::Upstream(_) => StatusCode::BAD_GATEWAY,
            OrderError::DataAccess(e) => {
                error!(error = %e, "data access failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response();
            }
            OrderError::CreditRejected | OrderError::StockUnavailable { .. } => StatusCode::CONFLICT,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::InsufficientRole(_) => StatusCode::FORBIDDEN,
            AuthError::MissingCredential
            | AuthError::InvalidToken(_)
            | AuthError::KeyUnavailable(_) => StatusCode::UNAUTHORIZED,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

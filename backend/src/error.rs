use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::notify::DeliveryError;

/// Error taxonomy for the valentine backend.
///
/// Validation failures surface immediately to the initiating action so the
/// caller can re-prompt. Malformed stored data is a defect: the lifecycle
/// engine rejects it instead of guessing. Nothing in this crate retries.
#[derive(Debug, Error)]
pub enum AppError {
    /// A stored card is missing required data or carries an unparseable
    /// timestamp. Fatal to the single read that hit it, not to the process.
    #[error("Invalid card data: {0}")]
    InvalidCardData(String),

    #[error("Valentine not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Admin token required")]
    Unauthorized,

    /// Notification delivery failure. Logged and discarded on the send path;
    /// never propagated to the sender-facing result.
    #[error("Notification delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::InvalidCardData(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Delivery(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

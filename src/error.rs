use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::HoldStatus;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    // Edge validation: rejected before the core runs.
    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // Business-rule outcomes. The messages are part of the API contract.
    #[error("Product not found")]
    ProductNotFound,

    #[error("Insufficient stock. Available: {available}")]
    InsufficientStock { available: i32 },

    #[error("Hold not found")]
    HoldNotFound,

    #[error("Hold is {status} and cannot be used")]
    HoldNotActive { status: HoldStatus },

    #[error("Hold has expired")]
    HoldExpired,

    #[error("Hold has already been used for an order")]
    HoldAlreadyUsed,

    #[error("Order not found - webhook may have arrived early")]
    OrderNotArrived,

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::ProductNotFound => (StatusCode::BAD_REQUEST, "PRODUCT_NOT_FOUND"),
            AppError::InsufficientStock { .. } => (StatusCode::BAD_REQUEST, "INSUFFICIENT_STOCK"),
            AppError::HoldNotFound => (StatusCode::BAD_REQUEST, "HOLD_NOT_FOUND"),
            AppError::HoldNotActive { .. } => (StatusCode::BAD_REQUEST, "HOLD_NOT_ACTIVE"),
            AppError::HoldExpired => (StatusCode::BAD_REQUEST, "HOLD_EXPIRED"),
            AppError::HoldAlreadyUsed => (StatusCode::BAD_REQUEST, "HOLD_ALREADY_USED"),
            AppError::OrderNotArrived => (StatusCode::BAD_REQUEST, "ORDER_NOT_FOUND"),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            AppError::Redis(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CACHE_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed with {}: {}", code, self);
        }

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details: None,
            },
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_message_carries_available_count() {
        let err = AppError::InsufficientStock { available: 1 };
        assert_eq!(err.to_string(), "Insufficient stock. Available: 1");
    }

    #[test]
    fn hold_not_active_message_embeds_status() {
        let err = AppError::HoldNotActive {
            status: HoldStatus::Used,
        };
        assert_eq!(err.to_string(), "Hold is used and cannot be used");
    }

    #[test]
    fn early_webhook_message_is_stable() {
        assert_eq!(
            AppError::OrderNotArrived.to_string(),
            "Order not found - webhook may have arrived early"
        );
    }

    #[test]
    fn validation_maps_to_422() {
        let resp = AppError::Validation("quantity must be at least 1".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn business_errors_map_to_400() {
        for err in [
            AppError::ProductNotFound,
            AppError::InsufficientStock { available: 0 },
            AppError::HoldNotFound,
            AppError::HoldExpired,
            AppError::HoldAlreadyUsed,
            AppError::OrderNotArrived,
        ] {
            assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn product_lookup_miss_maps_to_404() {
        let resp = AppError::NotFound("Product not found".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

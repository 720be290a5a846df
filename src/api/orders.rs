use super::AppState;
use crate::{
    error::{AppError, Result},
    models::{ApiResponse, Order, OrderStatus},
    services::OrderService,
    utils::format_amount,
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub hold_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct OrderCreatedResponse {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub total_price: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl OrderCreatedResponse {
    fn from_order(order: &Order) -> Self {
        Self {
            order_id: order.id,
            product_id: order.product_id,
            quantity: order.quantity,
            total_price: format_amount(order.total_price),
            status: order.status,
            created_at: order.created_at,
        }
    }
}

/// POST /orders
pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderCreatedResponse>>)> {
    let Some(hold_id) = req.hold_id else {
        return Err(AppError::Validation("hold_id is required".to_string()));
    };

    if !state.db.hold_exists(hold_id).await? {
        return Err(AppError::Validation(
            "The selected hold_id is invalid".to_string(),
        ));
    }

    let service = OrderService::new(state.db.clone());
    let order = service.create_order_from_hold(hold_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(OrderCreatedResponse::from_order(
            &order,
        ))),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn response_formats_total_as_decimal_string() {
        let order = Order {
            id: 11,
            hold_id: 5,
            product_id: 2,
            quantity: 5,
            total_price: Decimal::new(49995, 2),
            status: OrderStatus::Pending,
            paid_at: None,
            created_at: Utc::now(),
        };
        let response = OrderCreatedResponse::from_order(&order);
        assert_eq!(response.total_price, "499.95");
        assert_eq!(response.status, OrderStatus::Pending);
        assert_eq!(response.order_id, 11);
    }
}

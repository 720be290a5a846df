use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ==================== PRODUCT ====================
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==================== HOLD ====================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "hold_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HoldStatus {
    Active,
    Used,
    Expired,
}

impl std::fmt::Display for HoldStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HoldStatus::Active => write!(f, "active"),
            HoldStatus::Used => write!(f, "used"),
            HoldStatus::Expired => write!(f, "expired"),
        }
    }
}

/// A time-bounded reservation of stock for one product.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Hold {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub status: HoldStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// ==================== ORDER ====================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Paid => write!(f, "paid"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A hold that was converted before expiry. The stock it covers stays
/// debited until the order is paid or cancelled.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub hold_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// ==================== WEBHOOK LOG ====================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "webhook_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Success,
    Failure,
}

impl PaymentStatus {
    /// Parse the wire value of `payment_status`. Anything outside the two
    /// known values is a validation failure at the edge.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "success" => Some(PaymentStatus::Success),
            "failure" => Some(PaymentStatus::Failure),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Success => write!(f, "success"),
            PaymentStatus::Failure => write!(f, "failure"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WebhookLog {
    pub id: i64,
    pub idempotency_key: String,
    pub order_id: Option<i64>,
    pub status: PaymentStatus,
    pub payload: serde_json::Value,
    pub processed_at: DateTime<Utc>,
}

// ==================== API RESPONSE ====================
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Handles `success` logic.
    ///
    /// # Arguments
    /// * Uses function parameters as validated input and runtime context.
    ///
    /// # Returns
    /// * `Ok(...)` when processing succeeds.
    /// * `Err(AppError)` when validation, authorization, or integration checks fail.
    ///
    /// # Notes
    /// * May update state, query storage, or invoke checkout/settlement paths depending on flow.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_response_success_sets_flag() {
        let response = ApiResponse::success("ok");
        assert!(response.success);
        assert_eq!(response.data, "ok");
    }

    #[test]
    fn hold_status_displays_lowercase() {
        assert_eq!(HoldStatus::Active.to_string(), "active");
        assert_eq!(HoldStatus::Used.to_string(), "used");
        assert_eq!(HoldStatus::Expired.to_string(), "expired");
    }

    #[test]
    fn payment_status_parses_known_values_only() {
        assert_eq!(PaymentStatus::parse("success"), Some(PaymentStatus::Success));
        assert_eq!(PaymentStatus::parse("failure"), Some(PaymentStatus::Failure));
        assert_eq!(PaymentStatus::parse("SUCCESS"), None);
        assert_eq!(PaymentStatus::parse("refunded"), None);
        assert_eq!(PaymentStatus::parse(""), None);
    }

    #[test]
    fn order_status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        let back: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(back, OrderStatus::Cancelled);
    }
}

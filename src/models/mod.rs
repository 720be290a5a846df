// src/models/mod.rs
pub mod checkout;

// Re-export so other modules can use `crate::models::X`
pub use checkout::{
    ApiResponse, Hold, HoldStatus, Order, OrderStatus, PaymentStatus, Product, WebhookLog,
};

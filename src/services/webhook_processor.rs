use crate::{
    db::Database,
    error::{AppError, Result},
    models::{Order, PaymentStatus},
    services::{is_unique_violation, order_service::OrderService, product_cache::ProductCache},
};
use serde::Serialize;

pub const MSG_ALREADY_PROCESSED: &str = "Webhook already processed";
pub const MSG_PAYMENT_SUCCESS: &str = "Payment successful, order marked as paid";
pub const MSG_PAYMENT_FAILURE: &str = "Payment failed, order cancelled and stock returned";

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub message: String,
    pub already_processed: bool,
}

impl WebhookAck {
    fn replay() -> Self {
        Self {
            message: MSG_ALREADY_PROCESSED.to_string(),
            already_processed: true,
        }
    }

    fn processed(message: &str) -> Self {
        Self {
            message: message.to_string(),
            already_processed: false,
        }
    }
}

/// Settlement side of the checkout core. Collapses arbitrary redeliveries of
/// one idempotency key into a single committed effect, whatever the
/// interleaving with order creation or with other deliveries of the key.
pub struct WebhookProcessor {
    db: Database,
    cache: ProductCache,
    orders: OrderService,
}

impl WebhookProcessor {
    pub fn new(db: Database, cache: ProductCache) -> Self {
        let orders = OrderService::new(db.clone());
        Self { db, cache, orders }
    }

    pub async fn process_webhook(
        &self,
        idempotency_key: &str,
        order_id: i64,
        payment_status: PaymentStatus,
        payload: &serde_json::Value,
    ) -> Result<WebhookAck> {
        // Fast path: a committed log row is authoritative, whatever the
        // incoming payload claims.
        if self.db.get_webhook_log(idempotency_key).await?.is_some() {
            return Ok(WebhookAck::replay());
        }

        let mut tx = self.db.pool().begin().await?;

        // The UNIQUE key on webhook_logs is the linearisation point: two
        // deliveries that both passed the fast path race here, and exactly
        // one insert commits.
        let inserted = sqlx::query(
            "INSERT INTO webhook_logs (idempotency_key, order_id, status, payload)
             VALUES ($1, NULL, $2, $3)",
        )
        .bind(idempotency_key)
        .bind(payment_status)
        .bind(payload)
        .execute(&mut *tx)
        .await;
        if let Err(err) = inserted {
            if is_unique_violation(&err) {
                return Ok(WebhookAck::replay());
            }
            return Err(err.into());
        }

        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(order) = order else {
            // Delivery beat order creation. Commit the log with a null
            // order reference so replays of this key are suppressed, and
            // reject the delivery; a retry would never find the order
            // either. Operators reconcile these rows out-of-band.
            tx.commit().await?;
            tracing::warn!(
                "Webhook {} arrived before order {}; logged and rejected",
                idempotency_key,
                order_id
            );
            return Err(AppError::OrderNotArrived);
        };

        sqlx::query("UPDATE webhook_logs SET order_id = $1 WHERE idempotency_key = $2")
            .bind(order.id)
            .bind(idempotency_key)
            .execute(&mut *tx)
            .await?;

        match payment_status {
            PaymentStatus::Success => {
                // Pending-only, symmetric with cancellation: a settled
                // order is never flipped again.
                sqlx::query(
                    "UPDATE orders SET status = 'paid', paid_at = NOW()
                     WHERE id = $1 AND status = 'pending'",
                )
                .bind(order.id)
                .execute(&mut *tx)
                .await?;
                tx.commit().await?;
                tracing::info!("Order {} marked paid via webhook {}", order.id, idempotency_key);
                Ok(WebhookAck::processed(MSG_PAYMENT_SUCCESS))
            }
            PaymentStatus::Failure => {
                let cancelled = self.orders.cancel_order(&mut tx, &order).await?;
                tx.commit().await?;
                if cancelled {
                    self.cache.forget(order.product_id).await;
                }
                tracing::info!(
                    "Order {} cancelled via webhook {} (stock returned: {})",
                    order.id,
                    idempotency_key,
                    cancelled
                );
                Ok(WebhookAck::processed(MSG_PAYMENT_FAILURE))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_ack_is_marked_already_processed() {
        let ack = WebhookAck::replay();
        assert!(ack.already_processed);
        assert_eq!(ack.message, "Webhook already processed");
    }

    #[test]
    fn settlement_messages_are_stable() {
        assert_eq!(
            WebhookAck::processed(MSG_PAYMENT_SUCCESS).message,
            "Payment successful, order marked as paid"
        );
        assert_eq!(
            WebhookAck::processed(MSG_PAYMENT_FAILURE).message,
            "Payment failed, order cancelled and stock returned"
        );
    }
}

use crate::{
    db::Database,
    error::{AppError, Result},
    models::{HoldStatus, Order},
    services::is_unique_violation,
};
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};

/// Snapshot of a hold taken under lock, with everything the conversion
/// pre-checks need resolved on the database side.
#[derive(sqlx::FromRow)]
struct HoldForConversion {
    product_id: i64,
    quantity: i32,
    status: HoldStatus,
    price: Decimal,
    expired: bool,
    has_order: bool,
}

// Internal helper that supports `order_total` operations.
fn order_total(price: Decimal, quantity: i32) -> Decimal {
    price * Decimal::from(quantity)
}

/// Conversion side of the checkout core: turns a still-valid hold into a
/// pending order and retires the hold. Stock is untouched on conversion;
/// the units were already debited when the hold was created.
pub struct OrderService {
    db: Database,
}

impl OrderService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create_order_from_hold(&self, hold_id: i64) -> Result<Order> {
        let mut tx = self.db.pool().begin().await?;

        let hold = sqlx::query_as::<_, HoldForConversion>(
            "SELECT h.product_id, h.quantity, h.status,
                    p.price,
                    h.expires_at <= NOW() AS expired,
                    EXISTS(SELECT 1 FROM orders o WHERE o.hold_id = h.id) AS has_order
             FROM holds h
             JOIN products p ON p.id = h.product_id
             WHERE h.id = $1
             FOR UPDATE OF h",
        )
        .bind(hold_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(hold) = hold else {
            return Err(AppError::HoldNotFound);
        };

        if hold.status != HoldStatus::Active {
            return Err(AppError::HoldNotActive {
                status: hold.status,
            });
        }
        // The sweeper may not have caught it yet; the deadline still binds.
        if hold.expired {
            return Err(AppError::HoldExpired);
        }
        if hold.has_order {
            return Err(AppError::HoldAlreadyUsed);
        }

        let total_price = order_total(hold.price, hold.quantity);

        // The UNIQUE constraint on orders.hold_id decides any race that
        // slipped past the pre-checks: exactly one insert commits.
        let inserted = sqlx::query_as::<_, Order>(
            "INSERT INTO orders (hold_id, product_id, quantity, total_price, status)
             VALUES ($1, $2, $3, $4, 'pending')
             RETURNING *",
        )
        .bind(hold_id)
        .bind(hold.product_id)
        .bind(hold.quantity)
        .bind(total_price)
        .fetch_one(&mut *tx)
        .await;
        let order = match inserted {
            Ok(order) => order,
            Err(err) if is_unique_violation(&err) => return Err(AppError::HoldAlreadyUsed),
            Err(err) => return Err(err.into()),
        };

        let used = sqlx::query("UPDATE holds SET status = 'used' WHERE id = $1 AND status = 'active'")
            .bind(hold_id)
            .execute(&mut *tx)
            .await?;
        if used.rows_affected() == 0 {
            return Err(AppError::Internal(format!(
                "hold {} changed state during conversion",
                hold_id
            )));
        }

        tx.commit().await?;
        tracing::info!(
            "Order {} created from hold {}: product={} quantity={} total={}",
            order.id,
            hold_id,
            order.product_id,
            order.quantity,
            order.total_price
        );
        Ok(order)
    }

    /// Cancel a pending order inside the caller's transaction: lock the
    /// product row, flip the order pending->cancelled, return its units to
    /// stock. Any other status is a no-op returning false. The underlying
    /// hold stays `used`. The caller invalidates the product cache after
    /// commit when this returns true.
    pub async fn cancel_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &Order,
    ) -> Result<bool> {
        let _: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(order.product_id)
            .fetch_optional(&mut **tx)
            .await?;

        let updated =
            sqlx::query("UPDATE orders SET status = 'cancelled' WHERE id = $1 AND status = 'pending'")
                .bind(order.id)
                .execute(&mut **tx)
                .await?;
        if updated.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE products SET stock = stock + $1, updated_at = NOW() WHERE id = $2")
            .bind(order.quantity)
            .bind(order.product_id)
            .execute(&mut **tx)
            .await?;

        tracing::info!(
            "Order {} cancelled: returned {} unit(s) to product {}",
            order.id,
            order.quantity,
            order.product_id
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_total_is_exact_decimal_arithmetic() {
        // 99.99 * 5 must come out as 499.95, not a binary-float neighbour.
        let total = order_total(Decimal::new(9999, 2), 5);
        assert_eq!(total, Decimal::new(49995, 2));
    }

    #[test]
    fn order_total_for_single_unit_is_the_price() {
        let price = Decimal::new(14900, 2);
        assert_eq!(order_total(price, 1), price);
    }

    #[test]
    fn order_total_handles_zero_price() {
        assert_eq!(order_total(Decimal::ZERO, 3), Decimal::ZERO);
    }
}

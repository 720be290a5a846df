use crate::{
    config::Config,
    db::Database,
    error::{AppError, Result},
    models::{Hold, HoldStatus},
    services::{is_deadlock, product_cache::ProductCache},
};
use chrono::{DateTime, Utc};

/// Outcome of a committed reservation.
#[derive(Debug, Clone)]
pub struct CreatedHold {
    pub hold_id: i64,
    pub expires_at: DateTime<Utc>,
}

/// Reservation side of the checkout core: decrements stock under a product
/// row lock and creates time-bounded holds; gives the stock back when a
/// hold expires unconverted.
pub struct HoldService {
    db: Database,
    cache: ProductCache,
    config: Config,
}

impl HoldService {
    pub fn new(db: Database, cache: ProductCache, config: Config) -> Self {
        Self { db, cache, config }
    }

    /// Reserve `quantity` units of a product. The product row lock is the
    /// only arbiter between contending buyers: whoever the database grants
    /// the lock first gets the stock.
    pub async fn create_hold(&self, product_id: i64, quantity: i32) -> Result<CreatedHold> {
        let max_attempts = self.config.lock_retry_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_create_hold(product_id, quantity).await {
                Err(err) if is_deadlock(&err) && attempt < max_attempts => {
                    tracing::warn!(
                        "Deadlock while reserving product {} (attempt {}/{}), retrying",
                        product_id,
                        attempt,
                        max_attempts
                    );
                }
                Ok(created) => {
                    self.cache.forget(product_id).await;
                    tracing::info!(
                        "Hold {} created: product={} quantity={} expires_at={}",
                        created.hold_id,
                        product_id,
                        quantity,
                        created.expires_at
                    );
                    return Ok(created);
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_create_hold(&self, product_id: i64, quantity: i32) -> Result<CreatedHold> {
        let mut tx = self.db.pool().begin().await?;

        let stock: Option<i32> =
            sqlx::query_scalar("SELECT stock FROM products WHERE id = $1 FOR UPDATE")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(stock) = stock else {
            return Err(AppError::ProductNotFound);
        };

        if stock < quantity {
            // Dropping the transaction rolls it back; nothing was written.
            return Err(AppError::InsufficientStock { available: stock });
        }

        sqlx::query("UPDATE products SET stock = stock - $1, updated_at = NOW() WHERE id = $2")
            .bind(quantity)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        let (hold_id, expires_at): (i64, DateTime<Utc>) = sqlx::query_as(
            "INSERT INTO holds (product_id, quantity, status, expires_at)
             VALUES ($1, $2, 'active', NOW() + make_interval(secs => $3))
             RETURNING id, expires_at",
        )
        .bind(product_id)
        .bind(quantity)
        .bind(self.config.hold_ttl_secs as f64)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(CreatedHold {
            hold_id,
            expires_at,
        })
    }

    /// Return the stock of a stale hold. Re-checks the hold under the
    /// product lock: a concurrent conversion may have used it between the
    /// sweeper's scan and this transaction, and that is not an error.
    /// Returns true iff a release actually happened.
    pub async fn release_expired_hold(&self, hold: &Hold) -> Result<bool> {
        let mut tx = self.db.pool().begin().await?;

        // Product lock first, same order as every other stock mutation.
        let product: Option<i64> =
            sqlx::query_scalar("SELECT id FROM products WHERE id = $1 FOR UPDATE")
                .bind(hold.product_id)
                .fetch_optional(&mut *tx)
                .await?;
        if product.is_none() {
            return Ok(false);
        }

        let current = sqlx::query_as::<_, Hold>("SELECT * FROM holds WHERE id = $1 FOR UPDATE")
            .bind(hold.id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(current) = current else {
            return Ok(false);
        };
        if current.status != HoldStatus::Active {
            return Ok(false);
        }

        // Re-assert the deadline against the database clock under lock.
        let marked = sqlx::query(
            "UPDATE holds SET status = 'expired'
             WHERE id = $1 AND status = 'active' AND expires_at < NOW()",
        )
        .bind(hold.id)
        .execute(&mut *tx)
        .await?;
        if marked.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE products SET stock = stock + $1, updated_at = NOW() WHERE id = $2")
            .bind(current.quantity)
            .bind(current.product_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        self.cache.forget(current.product_id).await;
        tracing::info!(
            "Hold {} expired: returned {} unit(s) to product {}",
            current.id,
            current.quantity,
            current.product_id
        );
        Ok(true)
    }
}

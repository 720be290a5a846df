use crate::{config::Config, error::Result, models::*};
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Constructs a new instance via `new`.
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
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Handles `run_migrations` logic.
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
    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Handles `pool` logic.
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
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ==================== PRODUCT QUERIES ====================
impl Database {
    /// Fetches data for `get_product`.
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
    pub async fn get_product(&self, product_id: i64) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Checks conditions for `product_exists`.
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
    pub async fn product_exists(&self, product_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
            .bind(product_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Fetches data for `count_products`.
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
    pub async fn count_products(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Builds inputs required by `insert_product`.
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
    pub async fn insert_product(
        &self,
        name: &str,
        description: &str,
        price: Decimal,
        stock: i32,
    ) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO products (name, description, price, stock)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(stock)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }
}

// ==================== HOLD QUERIES ====================
impl Database {
    /// Checks conditions for `hold_exists`.
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
    pub async fn hold_exists(&self, hold_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM holds WHERE id = $1)")
            .bind(hold_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Fetches data for `list_expired_active_holds`.
    ///
    /// # Arguments
    /// * Uses function parameters as validated input and runtime context.
    ///
    /// # Returns
    /// * `Ok(...)` when processing succeeds.
    /// * `Err(AppError)` when validation, authorization, or integration checks fail.
    ///
    /// # Notes
    /// * Stale reservations: still marked active but past their deadline.
    ///   Scanned without locks; the release path re-checks under lock.
    pub async fn list_expired_active_holds(&self) -> Result<Vec<Hold>> {
        let holds = sqlx::query_as::<_, Hold>(
            "SELECT * FROM holds
             WHERE status = 'active' AND expires_at < NOW()
             ORDER BY expires_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(holds)
    }
}

// ==================== WEBHOOK LOG QUERIES ====================
impl Database {
    /// Fetches data for `get_webhook_log`.
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
    pub async fn get_webhook_log(&self, idempotency_key: &str) -> Result<Option<WebhookLog>> {
        let log = sqlx::query_as::<_, WebhookLog>(
            "SELECT * FROM webhook_logs WHERE idempotency_key = $1",
        )
        .bind(idempotency_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(database_url: &str) -> Config {
        Config {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "development".to_string(),
            database_url: database_url.to_string(),
            database_max_connections: 1,
            redis_url: "redis://localhost:6379".to_string(),
            hold_ttl_secs: 120,
            sweeper_interval_secs: 30,
            product_cache_ttl_secs: 300,
            lock_retry_attempts: 3,
            cors_allowed_origins: "*".to_string(),
        }
    }

    #[tokio::test]
    async fn database_new_returns_error_on_invalid_url() {
        let config = test_config("not-a-url");
        let result = Database::new(&config).await;
        assert!(result.is_err());
    }
}

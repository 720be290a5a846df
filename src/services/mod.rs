// All service modules
pub mod expiry_sweeper;
pub mod hold_service;
pub mod order_service;
pub mod product_cache;
pub mod seed;
pub mod webhook_processor;

// Re-export for convenience
pub use expiry_sweeper::ExpirySweeper;
pub use hold_service::HoldService;
pub use order_service::OrderService;
pub use product_cache::ProductCache;
pub use webhook_processor::WebhookProcessor;

use crate::{config::Config, db::Database, error::AppError};
use redis::aio::ConnectionManager;
use std::sync::Arc;

// Internal helper that checks conditions for `is_env_flag_enabled`.
fn is_env_flag_enabled(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|value| {
            let normalized = value.trim().to_ascii_lowercase();
            normalized == "1" || normalized == "true" || normalized == "yes" || normalized == "on"
        })
        .unwrap_or(false)
}

// Internal helper that checks conditions for `is_deadlock` (SQLSTATE 40P01).
pub(crate) fn is_deadlock(err: &AppError) -> bool {
    match err {
        AppError::Database(sqlx::Error::Database(db_err)) => {
            db_err.code().as_deref() == Some("40P01")
        }
        _ => false,
    }
}

// Internal helper that checks conditions for `is_unique_violation` (SQLSTATE 23505).
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.code().as_deref() == Some("23505"))
        .unwrap_or(false)
}

/// Start all background services
pub async fn start_background_services(db: Database, redis: ConnectionManager, config: Config) {
    tracing::info!("Starting background services...");

    // One-off catalog seed for fresh environments
    if is_env_flag_enabled("RUN_PRODUCT_SEED") {
        tracing::info!("Running product seed job...");
        match seed::seed_products(&db).await {
            Ok(count) => tracing::info!("Product seed inserted {} product(s)", count),
            Err(err) => tracing::error!("Product seed failed: {}", err),
        }
    }

    // Expiry sweeper; operators running sweeps externally can disable the loop
    let enable_sweeper = if std::env::var("ENABLE_EXPIRY_SWEEPER").is_ok() {
        is_env_flag_enabled("ENABLE_EXPIRY_SWEEPER")
    } else {
        true
    };
    if enable_sweeper {
        let cache = ProductCache::new(redis, config.product_cache_ttl_secs);
        let holds = HoldService::new(db.clone(), cache, config.clone());
        let sweeper = Arc::new(ExpirySweeper::new(
            db.clone(),
            holds,
            config.sweeper_interval_secs,
        ));
        sweeper.start().await;
    } else {
        tracing::warn!("Expiry sweeper disabled via ENABLE_EXPIRY_SWEEPER");
    }

    tracing::info!("All background services started successfully");
}

use crate::constants::{
    DEFAULT_HOLD_TTL_SECS, DEFAULT_LOCK_RETRY_ATTEMPTS, DEFAULT_PRODUCT_CACHE_TTL_SECS,
    DEFAULT_SWEEPER_INTERVAL_SECS,
};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Redis
    pub redis_url: String,

    // Reservation lifecycle
    pub hold_ttl_secs: u64,
    pub sweeper_interval_secs: u64,

    // Product cache
    pub product_cache_ttl_secs: u64,

    // Contention handling
    pub lock_retry_attempts: u32,

    // CORS
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            database_url: env::var("DATABASE_URL")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()?,

            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),

            hold_ttl_secs: env::var("HOLD_TTL_SECS")
                .unwrap_or_else(|_| DEFAULT_HOLD_TTL_SECS.to_string())
                .parse()?,
            sweeper_interval_secs: env::var("SWEEPER_INTERVAL_SECS")
                .unwrap_or_else(|_| DEFAULT_SWEEPER_INTERVAL_SECS.to_string())
                .parse()?,

            product_cache_ttl_secs: env::var("PRODUCT_CACHE_TTL_SECS")
                .unwrap_or_else(|_| DEFAULT_PRODUCT_CACHE_TTL_SECS.to_string())
                .parse()?,

            lock_retry_attempts: env::var("LOCK_RETRY_ATTEMPTS")
                .unwrap_or_else(|_| DEFAULT_LOCK_RETRY_ATTEMPTS.to_string())
                .parse()?,

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL is empty");
        }
        if self.hold_ttl_secs == 0 {
            anyhow::bail!("HOLD_TTL_SECS must be > 0");
        }
        if self.sweeper_interval_secs == 0 {
            anyhow::bail!("SWEEPER_INTERVAL_SECS must be > 0");
        }

        if self.sweeper_interval_secs > self.hold_ttl_secs / 2 {
            tracing::warn!(
                "SWEEPER_INTERVAL_SECS ({}) exceeds half the hold TTL ({}); expired holds may linger a full extra tick",
                self.sweeper_interval_secs,
                self.hold_ttl_secs
            );
        }
        if self.product_cache_ttl_secs == 0 {
            tracing::warn!("PRODUCT_CACHE_TTL_SECS is 0; product reads will always hit the database");
        }
        if self.lock_retry_attempts == 0 {
            tracing::warn!("LOCK_RETRY_ATTEMPTS is 0; deadlocked transactions will not be retried");
        }
        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; browser requests may be blocked");
        }

        Ok(())
    }
}

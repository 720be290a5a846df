// src/api/mod.rs

pub mod health;
pub mod holds;
pub mod orders;
pub mod payments;
pub mod products;

use crate::config::Config;
use crate::db::Database;
use crate::services::ProductCache;
use redis::aio::ConnectionManager;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub redis: ConnectionManager,
    pub config: Config,
}

impl AppState {
    /// Cache handle for the request being served.
    pub fn product_cache(&self) -> ProductCache {
        ProductCache::new(self.redis.clone(), self.config.product_cache_ttl_secs)
    }
}

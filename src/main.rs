use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod constants;
mod db;
mod error;
mod models;
mod services;
mod utils;

use anyhow::Context;
use config::Config;
use constants::API_VERSION;
use db::Database;

#[tokio::main]
// Internal helper that supports `main` operations.
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "flashsale_backend=info,tower_http=warn,sqlx::query=error,sqlx::pool::acquire=error"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting Flash-Sale Checkout Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("API Version: {}", API_VERSION);
    tracing::info!(
        "Hold TTL: {}s, sweeper interval: {}s, product cache TTL: {}s",
        config.hold_ttl_secs,
        config.sweeper_interval_secs,
        config.product_cache_ttl_secs
    );

    // Initialize database
    let db = Database::new(&config).await?;

    // Run migrations
    tracing::info!("Running database migrations...");
    db.run_migrations().await?;

    // Initialize Redis
    tracing::info!("Initializing Redis connection manager...");
    let redis =
        redis::Client::open(config.redis_url.clone()).context("invalid REDIS_URL format")?;
    let redis_manager_config = redis::aio::ConnectionManagerConfig::new()
        .set_connection_timeout(Some(Duration::from_secs(10)))
        .set_response_timeout(Some(Duration::from_secs(5)))
        .set_number_of_retries(10)
        .set_min_delay(Duration::from_millis(200))
        .set_max_delay(Duration::from_secs(3));
    let redis_manager = redis::aio::ConnectionManager::new_with_config(redis, redis_manager_config)
        .await
        .context("failed to initialize Redis connection manager (check REDIS_URL and network)")?;
    tracing::info!("Redis connection manager initialized");

    let app_state = api::AppState {
        db: db.clone(),
        redis: redis_manager.clone(),
        config: config.clone(),
    };

    // Build router
    let app = build_router(app_state);

    // Start background services (expiry sweeper, optional seed job)
    tokio::spawn(services::start_background_services(
        db.clone(),
        redis_manager,
        config.clone(),
    ));

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid listen address")?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// Internal helper that builds inputs for `build_router`.
fn build_router(state: api::AppState) -> Router {
    let cors = cors_from_config(&state.config);

    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Product lookup (read-only, cache-aside)
        .route("/products/{id}", get(api::products::get_product))
        // Reservation and checkout
        .route("/holds", post(api::holds::create_hold))
        .route("/orders", post(api::orders::create_order))
        // Payment settlement
        .route("/payments/webhook", post(api::payments::process_webhook))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// Internal helper that supports `cors_from_config` operations.
fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

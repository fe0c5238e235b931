//! Server setup and initialization
//!
//! Wires the infrastructure adapters into a `ServiceContext` and serves the
//! Axum application.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use booking_chat_cache::{RedisNotificationSink, RedisPool, RedisTaskQueue};
use booking_chat_common::{AppConfig, AppError, JwtService};
use booking_chat_core::SnowflakeGenerator;
use booking_chat_db::{
    create_pool, run_migrations, DatabaseConfig, PgBookingLookup, PgMessageRepository,
    PgThreadRepository,
};
use booking_chat_service::{ChatSettings, ServiceContext};
use booking_chat_storage::LocalObjectStore;
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::{apply_common_layers, apply_middleware_with_config};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();
    let api = apply_middleware_with_config(
        create_router(config.storage.max_file_size_bytes()),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    )?;
    let health = apply_common_layers(health_routes());

    Ok(api.merge(health).with_state(state))
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&DatabaseConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(format!("migrations failed: {e}")))?;
    info!("PostgreSQL connection established");

    info!("Connecting to Redis...");
    let redis_pool =
        RedisPool::from_config(&config.redis).map_err(|e| AppError::Cache(e.to_string()))?;
    info!("Redis pool created");

    let media_store = LocalObjectStore::from_config(&config.storage);
    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.access_token_expiry);

    let service_context = ServiceContext::builder()
        .thread_repo(Arc::new(PgThreadRepository::new(pool.clone())))
        .message_repo(Arc::new(PgMessageRepository::new(pool.clone())))
        .bookings(Arc::new(PgBookingLookup::new(pool.clone())))
        .object_store(Arc::new(media_store.clone()))
        .task_queue(Arc::new(RedisTaskQueue::new(redis_pool.clone())))
        .notifications(Arc::new(RedisNotificationSink::new(redis_pool.clone())))
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .settings(ChatSettings::from_config(&config))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(
        service_context,
        config,
        jwt_service,
        media_store,
        pool,
        redis_pool,
    ))
}

/// Run the HTTP server until Ctrl-C
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    info!("Server stopped");
    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid API address: {e}")))?;

    let state = create_app_state(config).await?;
    let app = create_app(state)?;

    run_server(app, addr).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

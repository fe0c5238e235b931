//! Worker initialization
//!
//! Builds the same `ServiceContext` the API uses and hands it to a
//! [`JobRunner`].

use std::sync::Arc;

use booking_chat_cache::{RedisNotificationSink, RedisPool, RedisTaskQueue};
use booking_chat_common::{AppConfig, AppError};
use booking_chat_core::SnowflakeGenerator;
use booking_chat_db::{
    create_pool, run_migrations, DatabaseConfig, PgBookingLookup, PgMessageRepository,
    PgThreadRepository,
};
use booking_chat_service::{ChatSettings, RetryPolicy, ServiceContext};
use booking_chat_storage::LocalObjectStore;
use tracing::info;

use crate::runner::{JobRunner, RunnerConfig};

/// Connect to PostgreSQL and Redis and build the runner
pub async fn create_runner(config: &AppConfig) -> Result<JobRunner, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&DatabaseConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(format!("migrations failed: {e}")))?;

    let redis_pool =
        RedisPool::from_config(&config.redis).map_err(|e| AppError::Cache(e.to_string()))?;
    redis_pool
        .health_check()
        .await
        .map_err(|e| AppError::Cache(e.to_string()))?;
    info!("Redis connection established");

    let queue = RedisTaskQueue::new(redis_pool.clone());

    let ctx = ServiceContext::builder()
        .thread_repo(Arc::new(PgThreadRepository::new(pool.clone())))
        .message_repo(Arc::new(PgMessageRepository::new(pool.clone())))
        .bookings(Arc::new(PgBookingLookup::new(pool)))
        .object_store(Arc::new(LocalObjectStore::from_config(&config.storage)))
        .task_queue(Arc::new(queue.clone()))
        .notifications(Arc::new(RedisNotificationSink::new(redis_pool)))
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .settings(ChatSettings::from_config(config))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(JobRunner::new(
        Arc::new(ctx),
        queue,
        RetryPolicy::from_config(&config.worker),
        RunnerConfig::from_config(&config.worker),
    ))
}

/// Run the worker until Ctrl-C, then drain in-flight jobs
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let runner = Arc::new(create_runner(&config).await?);
    runner.run_until(shutdown_signal()).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

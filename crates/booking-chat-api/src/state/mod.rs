//! Application state
//!
//! Shared handles for the Axum application: the chat service context,
//! configuration, token verification and the infrastructure probed by
//! readiness checks.

use std::sync::Arc;

use booking_chat_cache::RedisPool;
use booking_chat_common::{AppConfig, JwtService};
use booking_chat_db::PgPool;
use booking_chat_service::ServiceContext;
use booking_chat_storage::LocalObjectStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    config: Arc<AppConfig>,
    jwt_service: Arc<JwtService>,
    /// Serves signed media downloads
    media_store: LocalObjectStore,
    db_pool: PgPool,
    redis_pool: RedisPool,
}

impl AppState {
    pub fn new(
        service_context: ServiceContext,
        config: AppConfig,
        jwt_service: JwtService,
        media_store: LocalObjectStore,
        db_pool: PgPool,
        redis_pool: RedisPool,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
            jwt_service: Arc::new(jwt_service),
            media_store,
            db_pool,
            redis_pool,
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn media_store(&self) -> &LocalObjectStore {
        &self.media_store
    }

    pub fn db_pool(&self) -> &PgPool {
        &self.db_pool
    }

    pub fn redis_pool(&self) -> &RedisPool {
        &self.redis_pool
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("config", &"AppConfig")
            .field("media_root", &self.media_store.root())
            .finish()
    }
}

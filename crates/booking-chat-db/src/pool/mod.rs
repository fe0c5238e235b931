//! Connection pool and schema setup

mod postgres;

pub use postgres::{create_pool, run_migrations, DatabaseConfig};
pub use sqlx::PgPool;

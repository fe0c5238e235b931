//! # booking-chat-db
//!
//! PostgreSQL implementations of the thread, message and booking ports
//! defined in `booking-chat-core`:
//!
//! - Connection pool management and schema setup
//! - Row models with SQLx `FromRow` derives
//! - Entity <-> model mappers
//! - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use booking_chat_db::{create_pool, run_migrations, DatabaseConfig, PgThreadRepository};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::default()).await?;
//!     run_migrations(&pool).await?;
//!     let threads = PgThreadRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{PgBookingLookup, PgMessageRepository, PgThreadRepository};

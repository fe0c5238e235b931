//! Booking lookup backed by the host platform's `bookings` table

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use booking_chat_core::traits::{BookingLookup, RepoResult};
use booking_chat_core::value_objects::Snowflake;

use super::error::map_db_error;

/// Read-only view of bookings
#[derive(Clone)]
pub struct PgBookingLookup {
    pool: PgPool,
}

impl PgBookingLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingLookup for PgBookingLookup {
    #[instrument(skip(self))]
    async fn owner_of(&self, booking_id: Snowflake) -> RepoResult<Option<Snowflake>> {
        let owner = sqlx::query_scalar::<_, i64>("SELECT client_id FROM bookings WHERE id = $1")
            .bind(booking_id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(owner.map(Snowflake::new))
    }
}

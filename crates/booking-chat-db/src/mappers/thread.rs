//! Thread entity <-> model mapper

use booking_chat_core::entities::{Thread, ThreadStatus};
use booking_chat_core::error::DomainError;
use booking_chat_core::value_objects::Snowflake;

use crate::models::ThreadModel;

/// Rows with an unknown status are reported as database errors
impl TryFrom<ThreadModel> for Thread {
    type Error = DomainError;

    fn try_from(model: ThreadModel) -> Result<Self, Self::Error> {
        let status = model
            .status
            .parse::<ThreadStatus>()
            .map_err(DomainError::DatabaseError)?;

        Ok(Thread {
            id: Snowflake::new(model.id),
            booking_id: Snowflake::new(model.booking_id),
            client_id: Snowflake::new(model.client_id),
            admin_id: model.admin_id.map(Snowflake::new),
            status,
            opened_at: model.opened_at,
            close_requested_at: model.close_requested_at,
            closed_at: model.closed_at,
        })
    }
}

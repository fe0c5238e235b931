//! Booking - the external entity a thread is attached to

use crate::value_objects::Snowflake;

/// The slice of a booking the chat subsystem reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Booking {
    pub id: Snowflake,
    pub client_id: Snowflake,
}

impl Booking {
    /// The booking owner or any staff member may open its thread
    pub fn can_open_chat(&self, actor: &crate::entities::Actor) -> bool {
        actor.is_staff || actor.id == self.client_id
    }
}

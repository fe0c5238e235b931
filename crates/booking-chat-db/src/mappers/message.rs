//! Message entity <-> model mapper

use booking_chat_core::entities::{Message, MessageType};
use booking_chat_core::error::DomainError;
use booking_chat_core::value_objects::Snowflake;

use crate::models::MessageModel;

impl TryFrom<MessageModel> for Message {
    type Error = DomainError;

    fn try_from(model: MessageModel) -> Result<Self, Self::Error> {
        let kind = model
            .message_type
            .parse::<MessageType>()
            .map_err(DomainError::DatabaseError)?;

        Ok(Message {
            id: Snowflake::new(model.id),
            thread_id: Snowflake::new(model.thread_id),
            sender_id: Snowflake::new(model.sender_id),
            kind,
            text: model.text,
            media_path: model.media_path,
            latitude: model.latitude,
            longitude: model.longitude,
            created_at: model.created_at,
        })
    }
}

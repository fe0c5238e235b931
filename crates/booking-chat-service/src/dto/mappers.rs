//! Entity to DTO mappers

use booking_chat_core::{Message, Thread};

use super::responses::{MessageResponse, ThreadResponse};

impl From<&Thread> for ThreadResponse {
    fn from(thread: &Thread) -> Self {
        Self {
            id: thread.id,
            booking_id: thread.booking_id,
            client_id: thread.client_id,
            admin_id: thread.admin_id,
            status: thread.status,
            opened_at: thread.opened_at,
            close_requested_at: thread.close_requested_at,
            closed_at: thread.closed_at,
        }
    }
}

impl From<Thread> for ThreadResponse {
    fn from(thread: Thread) -> Self {
        Self::from(&thread)
    }
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            thread_id: message.thread_id,
            sender_id: message.sender_id,
            kind: message.kind,
            text: message.text,
            media_path: message.media_path,
            media_url: None,
            latitude: message.latitude,
            longitude: message.longitude,
            created_at: message.created_at,
        }
    }
}

impl MessageResponse {
    pub fn with_media_url(mut self, url: Option<String>) -> Self {
        self.media_url = url;
        self
    }
}

//! Pub/Sub channel naming.

use booking_chat_core::Snowflake;

/// Channel prefix for per-thread events
pub const THREAD_CHANNEL_PREFIX: &str = "chat:thread:";
/// Channel watched by staff dashboards
pub const STAFF_CHANNEL: &str = "chat:staff";

/// Pub/Sub channel types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PubSubChannel {
    /// Participants of one thread
    Thread(Snowflake),
    /// All staff
    Staff,
    Custom(String),
}

impl PubSubChannel {
    #[must_use]
    pub fn thread(thread_id: Snowflake) -> Self {
        Self::Thread(thread_id)
    }

    /// Get the Redis channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Thread(id) => format!("{THREAD_CHANNEL_PREFIX}{id}"),
            Self::Staff => STAFF_CHANNEL.to_string(),
            Self::Custom(name) => name.clone(),
        }
    }

    /// Parse a channel name back to a `PubSubChannel`
    #[must_use]
    pub fn parse(name: &str) -> Self {
        if name == STAFF_CHANNEL {
            return Self::Staff;
        }
        name.strip_prefix(THREAD_CHANNEL_PREFIX)
            .and_then(|id| Snowflake::parse(id).ok())
            .map_or_else(|| Self::Custom(name.to_string()), Self::Thread)
    }
}

impl std::fmt::Display for PubSubChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

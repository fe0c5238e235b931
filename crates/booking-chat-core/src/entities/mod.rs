//! Domain entities - core business objects

mod actor;
mod booking;
mod message;
mod thread;

pub use actor::Actor;
pub use booking::Booking;
pub use message::{Message, MessageContent, MessageType};
pub use thread::{Thread, ThreadStatus};

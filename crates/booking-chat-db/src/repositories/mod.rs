//! Repository implementations
//!
//! PostgreSQL implementations of the ports defined in booking-chat-core.

mod booking;
mod error;
mod message;
mod thread;

pub use booking::PgBookingLookup;
pub use message::PgMessageRepository;
pub use thread::PgThreadRepository;

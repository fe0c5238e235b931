//! Database models - row shapes as stored in PostgreSQL

mod message;
mod thread;

pub use message::MessageModel;
pub use thread::ThreadModel;

//! Ports implemented by the infrastructure crates

mod collaborators;
mod repositories;

pub use collaborators::{BookingLookup, NotificationSink, ObjectStore, TaskQueue};
pub use repositories::{MessageQuery, MessageRepository, RepoResult, ThreadRepository};

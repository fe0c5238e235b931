//! Domain events emitted by chat state changes

mod domain_event;

pub use domain_event::{DomainEvent, MessageCreatedEvent, ThreadClosedEvent};

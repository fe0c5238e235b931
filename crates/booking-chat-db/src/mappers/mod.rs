//! Entity <-> model mappers

mod message;
mod thread;

//! Route handlers

pub mod health;
pub mod media;
pub mod messages;
pub mod threads;

//! Business logic services

pub mod chat;
pub mod context;
pub mod error;

pub use chat::ChatService;
pub use context::{ChatSettings, ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};

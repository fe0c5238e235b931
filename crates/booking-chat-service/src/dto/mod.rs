//! Data transfer objects for API requests and responses
//!
//! - Request DTOs parse and validate client input
//! - Response DTOs serialize threads and messages for clients
//! - Mappers convert domain entities to response DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{ListMessagesQuery, PostMessageRequest, UploadMediaQuery};
pub use responses::{
    HealthChecks, HealthResponse, MediaUploadResponse, MessageResponse, ReadinessResponse,
    ThreadResponse,
};

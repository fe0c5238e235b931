//! Axum extractors for request handling
//!
//! Authentication, path ids and request bodies, all rejecting with `ApiError`.

mod auth;
mod body;
mod path;

pub use auth::AuthUser;
pub use body::{JsonBody, QueryParams};
pub use path::{parse_id, BookingIdPath, ThreadIdPath};

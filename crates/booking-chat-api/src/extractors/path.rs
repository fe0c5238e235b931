//! Path parameter extractors
//!
//! Ids arrive as strings and are parsed into `Snowflake`s here so that a
//! malformed id is a 400 rather than a 404.

use booking_chat_core::Snowflake;
use serde::Deserialize;

use crate::response::ApiError;

/// Parse a path segment as a Snowflake id
pub fn parse_id(raw: &str, name: &str) -> Result<Snowflake, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::invalid_path(format!("Invalid {name} format")))
}

/// Path parameters with booking_id
#[derive(Debug, Deserialize)]
pub struct BookingIdPath {
    pub booking_id: String,
}

impl BookingIdPath {
    pub fn booking_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.booking_id, "booking_id")
    }
}

/// Path parameters with thread_id
#[derive(Debug, Deserialize)]
pub struct ThreadIdPath {
    pub thread_id: String,
}

impl ThreadIdPath {
    pub fn thread_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.thread_id, "thread_id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_id() {
        let path = ThreadIdPath {
            thread_id: "123456789".to_string(),
        };
        assert_eq!(path.thread_id().unwrap(), Snowflake::new(123_456_789));
    }

    #[test]
    fn test_parse_invalid_id() {
        let path = BookingIdPath {
            booking_id: "abc".to_string(),
        };
        let err = path.booking_id().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PATH_PARAMETER");
        assert_eq!(err.to_string(), "Invalid path parameter: Invalid booking_id format");
    }
}

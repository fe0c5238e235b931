//! Domain errors - error types for the domain layer

use std::fmt;

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Why a message payload was rejected
///
/// The display text is the exact reason string surfaced to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    MissingText,
    InvalidMediaPath,
    InvalidCoordinates,
    InvalidMessageType,
}

impl ValidationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingText => "Text is required",
            Self::InvalidMediaPath => "Invalid media path for this thread",
            Self::InvalidCoordinates => "Invalid coordinates",
            Self::InvalidMessageType => "Invalid message type",
        }
    }
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Availability
    // =========================================================================
    #[error("Chat is currently unavailable")]
    FeatureDisabled,

    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Thread not found: {0}")]
    ThreadNotFound(Snowflake),

    #[error("Booking not found: {0}")]
    BookingNotFound(Snowflake),

    #[error("Media not found: {0}")]
    MediaNotFound(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not a participant of this thread")]
    Forbidden,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Thread is closed: {0}")]
    ThreadClosed(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("{0}")]
    Validation(ValidationReason),

    #[error("Validation error: {0}")]
    InvalidInput(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Queue error: {0}")]
    QueueError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::FeatureDisabled => "CHAT_DISABLED",

            // Not Found
            Self::ThreadNotFound(_) => "UNKNOWN_THREAD",
            Self::BookingNotFound(_) => "UNKNOWN_BOOKING",
            Self::MediaNotFound(_) => "UNKNOWN_MEDIA",

            // Authorization
            Self::Forbidden => "FORBIDDEN",

            // Conflict
            Self::ThreadClosed(_) => "THREAD_CLOSED",

            // Validation
            Self::Validation(_) | Self::InvalidInput(_) => "VALIDATION_ERROR",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::StorageError(_) => "STORAGE_ERROR",
            Self::QueueError(_) => "QUEUE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ThreadNotFound(_) | Self::BookingNotFound(_) | Self::MediaNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidInput(_))
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Forbidden)
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ThreadClosed(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::FeatureDisabled)
    }

    /// Infrastructure failures worth another attempt
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_) | Self::StorageError(_) | Self::QueueError(_) | Self::Timeout(_)
        )
    }
}

impl From<ValidationReason> for DomainError {
    fn from(reason: ValidationReason) -> Self {
        Self::Validation(reason)
    }
}

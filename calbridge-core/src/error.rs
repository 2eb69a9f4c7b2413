//! Error types for the calbridge workspace.

use thiserror::Error;

/// Errors that can occur in calbridge operations.
#[derive(Error, Debug)]
pub enum CalBridgeError {
    /// The caller has not been granted the access the operation requires.
    /// Raised before the store is touched.
    #[error("Permission denied: {0}")]
    Unauthorized(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    /// A caller-supplied field could not be interpreted. The first value
    /// names the offending field.
    #[error("Invalid `{0}`: {1}")]
    Malformed(&'static str, String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A store write or delete failed, or affected no rows.
    #[error("Store error: {0}")]
    Store(String),
}

/// Result type alias for calbridge operations.
pub type CalBridgeResult<T> = Result<T, CalBridgeError>;

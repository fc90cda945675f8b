//! Error types
//!
//! Neither kind crosses the reducer or connection manager boundary: decode
//! errors are logged and dropped, configuration errors only surface at
//! startup.

use thiserror::Error;

/// A stream event payload that could not be decoded
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed {event} payload: {source}")]
    Payload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Invalid stream configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid stream URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },

    #[error("{var} must be a non-negative integer (got '{value}')")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be a boolean (got '{value}')")]
    InvalidBool { var: &'static str, value: String },
}

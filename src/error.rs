//! Error types for session item operations.

use thiserror::Error;

/// Main error type for session item and codec operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid value format: {0}")]
    InvalidFormat(String),

    #[error("Checksum mismatch: expected {expected}, got {got}")]
    ChecksumMismatch { expected: u32, got: u32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SessionError {
    /// Whether this error came from decoding a stored payload.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            SessionError::Deserialization(_)
                | SessionError::InvalidFormat(_)
                | SessionError::ChecksumMismatch { .. }
        )
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(e: serde_json::Error) -> Self {
        SessionError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for SessionError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        SessionError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for SessionError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        SessionError::Deserialization(e.to_string())
    }
}

/// Result type for session item operations.
pub type Result<T> = std::result::Result<T, SessionError>;

//! Storage error types.

use thiserror::Error;

/// Storage-specific errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Store connection error (refused, dropped, timed out).
    #[error("store connection error: {message}")]
    ConnectionError { message: String },

    /// Protocol-level error returned by the store.
    #[error("store protocol error: {message}")]
    ProtocolError { message: String },

    /// A batch reply had a shape the command cannot produce.
    #[error("unexpected reply for {command}: {reply}")]
    UnexpectedReply { command: String, reply: String },

    /// A counter held a value that is not an integer.
    #[error("value at {key} is not an integer")]
    NotAnInteger { key: String },

    /// Internal error.
    #[error("internal storage error: {message}")]
    InternalError { message: String },
}

impl From<redis::RedisError> for StorageError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_connection_dropped() || err.is_timeout() {
            StorageError::ConnectionError {
                message: err.to_string(),
            }
        } else {
            StorageError::ProtocolError {
                message: err.to_string(),
            }
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

//! # Backend Errors
//!
//! Error types for data backend implementations.

use thiserror::Error;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Failures reported by a data backend.
///
/// Messages are surfaced to callers verbatim through the query result
/// envelope, so backends should keep them presentable.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The backend rejected or failed to execute the request
    #[error("{0}")]
    Execution(String),

    /// The backend could not be reached or the payload could not be decoded
    #[error("{0}")]
    Transport(String),
}

impl BackendError {
    /// The raw backend message.
    pub fn message(&self) -> &str {
        match self {
            BackendError::Execution(message) | BackendError::Transport(message) => message,
        }
    }

    /// Statement-timeout detection.
    ///
    /// Backends differ in how they type timeouts, so recognition is by
    /// message pattern rather than a dedicated variant.
    pub fn is_timeout(&self) -> bool {
        self.message().contains("statement timeout")
    }
}

//! Error types.

use thiserror::Error;

/// Error type for repository failures.
///
/// Repository implementations reduce whatever their transport produces to a
/// message; the picker never inspects the cause, it only converts failures
/// into empty-state reasons at the node boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RepositoryError {
    /// Error message.
    pub message: String,
}

impl RepositoryError {
    /// Create a new repository error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for RepositoryError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<String> for RepositoryError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for RepositoryError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

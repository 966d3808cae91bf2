//! Error types for coreflink-core.

use thiserror::Error;

/// Result type for coreflink-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for coreflink-core operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A mention position whose end precedes its start.
    #[error("Invalid position: {0}")]
    InvalidPosition(String),
}

impl Error {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid position error.
    #[must_use]
    pub fn invalid_position(msg: impl Into<String>) -> Self {
        Self::InvalidPosition(msg.into())
    }
}

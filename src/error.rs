//! Error types for coreflink.

use thiserror::Error;

/// Result type for coreflink operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for coreflink operations.
///
/// Missing or partial collaborator data is never an error; lookups recover
/// it locally as "absent". The only failure an annotation run surfaces is
/// the clustering engine's.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The clustering engine failed. Raised once, after token tags are restored.
    #[error("Clustering engine '{engine}' failed: {message}")]
    Engine {
        /// Name of the engine that failed.
        engine: String,
        /// Failure description.
        message: String,
    },

    /// The shared engine is held by another caller.
    #[error("Engine busy: {0}")]
    EngineBusy(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid document data.
    #[error(transparent)]
    Core(#[from] coreflink_core::Error),
}

impl Error {
    /// Create a clustering engine error.
    pub fn engine(engine: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Engine {
            engine: engine.into(),
            message: message.into(),
        }
    }

    /// Create an engine busy error.
    pub fn engine_busy(msg: impl Into<String>) -> Self {
        Error::EngineBusy(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Check if this error came from the clustering engine.
    #[must_use]
    pub fn is_engine_failure(&self) -> bool {
        matches!(self, Error::Engine { .. })
    }
}

//! Error types for hearth-core.

use thiserror::Error;

/// Result type alias using hearth-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for hearth operations
#[derive(Error, Debug)]
pub enum Error {
    // Lookup errors - surfaced to the caller, never fatal
    #[error("Pile not found: {0}")]
    PileNotFound(String),

    #[error("Task not found or not awaiting completion: {0}")]
    TaskNotFound(String),

    #[error("Task not found or not awaiting review: {0}")]
    ReviewNotFound(String),

    // Subsystem errors - degrade the dependent feature
    #[error("{service} unavailable: {reason}")]
    DependencyUnavailable { service: String, reason: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a DependencyUnavailable error for a named subsystem
    pub fn unavailable(service: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::DependencyUnavailable {
            service: service.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error is one of the not-found lookup conditions
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PileNotFound(_) | Self::TaskNotFound(_) | Self::ReviewNotFound(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

//! Error types for the steward library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for stewardship operations.
#[derive(Debug, Error)]
pub enum StewardError {
    /// A referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Caller supplied a malformed request (bad decision type, bad selection).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The caller's role lacks the permission an operation needs.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The backing store could not serve the request. Safe to retry.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Error saving or loading a store snapshot.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StewardError {
    /// Shorthand for a missing entity.
    pub fn entity_not_found(id: impl Into<String>) -> Self {
        StewardError::NotFound {
            kind: "Entity",
            id: id.into(),
        }
    }

    /// Check if this error means the target record is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StewardError::NotFound { .. })
    }
}

/// Result type alias for steward operations.
pub type Result<T> = std::result::Result<T, StewardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = StewardError::entity_not_found("HCP-42");
        assert_eq!(err.to_string(), "Entity not found: HCP-42");
        assert!(err.is_not_found());
        assert!(!StewardError::InvalidInput("x".into()).is_not_found());
    }
}

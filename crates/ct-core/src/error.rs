//! Error types for comment-tree

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for comment-tree
#[derive(Debug, Error)]
pub enum CommentTreeError {
    /// Caller passed an argument the core cannot work with (e.g. a zero limit)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Comment not found (or not visible to the viewer)
    #[error("Comment not found: {0}")]
    CommentNotFound(String),

    /// Commentable not found
    #[error("Commentable not found: {0}")]
    CommentableNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Unsupported snapshot schema version
    #[error("Unsupported schema version: {0}")]
    UnsupportedSchemaVersion(String),

    /// Fault raised by a comment source, passed through unchanged
    #[error(transparent)]
    Source(#[from] anyhow::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CommentTreeError>,
    },
}

impl CommentTreeError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CommentTreeError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<toml::de::Error> for CommentTreeError {
    fn from(err: toml::de::Error) -> Self {
        CommentTreeError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for CommentTreeError {
    fn from(err: toml::ser::Error) -> Self {
        CommentTreeError::Toml(err.to_string())
    }
}

/// Result type alias for comment-tree
pub type Result<T> = std::result::Result<T, CommentTreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CommentTreeError::InvalidArgument("limit must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid argument: limit must be positive");
    }

    #[test]
    fn test_error_with_context() {
        let err = CommentTreeError::CommentNotFound("17".to_string());
        let err = err.with_context("Failed to render permalink");
        assert!(err.to_string().contains("Failed to render permalink"));
        assert!(err.to_string().contains("17"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CommentTreeError = io_err.into();
        assert!(matches!(err, CommentTreeError::Io(_)));
    }

    #[test]
    fn test_source_error_passes_through() {
        let err: CommentTreeError = anyhow::anyhow!("database unavailable").into();
        assert_eq!(err.to_string(), "database unavailable");
    }
}

//! Error types for KeywordForge.
//!
//! Library crates use [`PipelineError`] via `thiserror`.
//! The CLI app wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all KeywordForge operations.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Data validation error (empty batch, out-of-range score, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Cache layer error.
    #[error("cache error: {0}")]
    Cache(String),

    /// Web search or content extraction error.
    #[error("research error: {0}")]
    Research(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Serialization/deserialization error.
    #[error("conversion error: {0}")]
    Conversion(String),

    /// A requested record does not exist.
    #[error("{what} not found")]
    NotFound { what: String },

    /// The requester does not own the batch.
    #[error("not authorized for this batch")]
    Unauthorized,

    /// A pipeline run already holds the processing lock for this batch.
    #[error("batch {batch_id} is already processing")]
    AlreadyProcessing { batch_id: String },

    /// The per-user request window is exhausted.
    #[error("rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a storage error from any displayable message.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a cache error from any displayable message.
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Create a research error from any displayable message.
    pub fn research(msg: impl Into<String>) -> Self {
        Self::Research(msg.into())
    }

    /// Create a not-found error naming the missing record.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = PipelineError::config("missing search endpoint");
        assert_eq!(err.to_string(), "config error: missing search endpoint");

        let err = PipelineError::not_found("batch 0199");
        assert_eq!(err.to_string(), "batch 0199 not found");

        let err = PipelineError::AlreadyProcessing {
            batch_id: "abc".into(),
        };
        assert!(err.to_string().contains("already processing"));
    }
}

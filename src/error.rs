//! Failure modes of the analyzer itself.
//!
//! These are distinct from the categories the analyzer assigns to LINE API
//! errors. `classify` never returns them; they surface from conversions,
//! context parsing, settings and result serialization.

use thiserror::Error;

/// Result type alias for analyzer operations that can fail.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Error type for the analyzer's own failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzerError {
    #[error("Unsupported error input: {kind}")]
    UnsupportedInput { kind: String },

    #[error("Invalid API context tag '{tag}': {reason}")]
    InvalidContext { tag: String, reason: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Configuration error: {key}: {message}")]
    Configuration { key: String, message: String },
}

impl AnalyzerError {
    /// Create an error for a top-level input shape the extractor does not accept.
    pub fn unsupported_input<S: Into<String>>(kind: S) -> Self {
        Self::UnsupportedInput { kind: kind.into() }
    }

    /// Create an error for an API context tag that cannot be interpreted.
    pub fn invalid_context<T: Into<String>, R: Into<String>>(tag: T, reason: R) -> Self {
        Self::InvalidContext {
            tag: tag.into(),
            reason: reason.into(),
        }
    }

    /// Create a serialization error.
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a configuration error for a specific settings key.
    pub fn configuration<K: Into<String>, M: Into<String>>(key: K, message: M) -> Self {
        Self::Configuration {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for AnalyzerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization error: {err}"),
        }
    }
}

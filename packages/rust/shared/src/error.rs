//! Error types for Sparkle.
//!
//! Library crates use [`SparkleError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all fallible Sparkle operations.
///
/// The enrichment pipeline itself is infallible; these variants cover the
/// edges around it (config files, host input, wire messages).
#[derive(Debug, thiserror::Error)]
pub enum SparkleError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Malformed input (URL, document snapshot, wire message).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A request that is well-formed but missing required data.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SparkleError>;

impl SparkleError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The bare message without the category prefix, as reported across the
    /// request boundary.
    pub fn message(&self) -> String {
        match self {
            Self::Config { message } | Self::Parse { message } | Self::Validation { message } => {
                message.clone()
            }
            Self::Io { source, .. } => source.to_string(),
        }
    }
}

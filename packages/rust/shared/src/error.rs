//! Error types for ao3recs.
//!
//! Library crates use [`RecsError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

use crate::types::TagCategory;

/// Top-level error type for all recommendation operations.
#[derive(Debug, thiserror::Error)]
pub enum RecsError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching an archive page.
    #[error("network error: {0}")]
    Network(String),

    /// An element the archive markup always carries was missing.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// The tag has no internal filter ID, so listings cannot be narrowed by it.
    #[error("tag '{name}' ({category}) cannot be filtered on")]
    NotFilterableTag { category: TagCategory, name: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid user input (e.g. a URL that does not point at a work).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RecsError>;

impl RecsError {
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
}

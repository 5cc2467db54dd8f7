//! Error types for mojipick core

use std::path::PathBuf;
use thiserror::Error;

/// Result type for mojipick core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// The emoji-test feed could not be read or downloaded
    #[error("Emoji source unavailable: {0}")]
    SourceUnavailable(String),

    /// Overrides file exists but could not be used
    #[error("Overrides unreadable at {path}: {reason}")]
    OverridesUnreadable { path: PathBuf, reason: String },

    /// Dataset, favorites or recent store exists but could not be used
    #[error("Store unreadable at {path}: {reason}")]
    StoreUnreadable { path: PathBuf, reason: String },

    /// Persisting a store failed
    #[error("Failed to write {path}: {reason}")]
    StoreWriteFailed { path: PathBuf, reason: String },

    /// The catalog was invalidated by a re-import and must be reloaded
    #[error("Catalog is stale, reload it before use")]
    CatalogStale,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::StoreUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write_failed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::StoreWriteFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

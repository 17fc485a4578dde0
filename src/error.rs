//! Error types for the storage layer
//!
//! Provides unified error handling using thiserror. Mediums propagate these
//! errors; the cache types swallow them at their public boundary.

use thiserror::Error;

// == Shelf Error Enum ==
/// Unified error type for storage mediums and cache internals.
#[derive(Error, Debug)]
pub enum ShelfError {
    /// Stored text could not be (de)serialized
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem failure while touching a persisted key
    #[error("I/O failure for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Medium is unusable (poisoned lock, unusable root directory)
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ShelfError {
    pub(crate) fn io(key: impl Into<String>, source: std::io::Error) -> Self {
        ShelfError::Io {
            key: key.into(),
            source,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the storage layer.
pub type Result<T> = std::result::Result<T, ShelfError>;

//! Error types for the snapshot store.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store file does not exist yet.
    #[error("store file {} does not exist", .path.display())]
    Missing { path: PathBuf },

    /// The store file exists but is not valid JSON of the expected shape.
    /// Nothing is written back to a path that failed this way.
    #[error("store file {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A read or write was issued without the mandatory date component.
    #[error("key has no date component")]
    InvalidKey,

    #[error("store file {} already exists", .path.display())]
    Exists { path: PathBuf },

    #[error("creating a store at {} was refused", .path.display())]
    Refused { path: PathBuf },

    /// The value does not match the level addressed by the key.
    #[error("expected a {expected} value for this key, got a {found} value")]
    ValueShape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize store: {0}")]
    Serialize(#[from] serde_json::Error),
}

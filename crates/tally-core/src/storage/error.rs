//! Storage error handling

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting the local mirror
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to create the data directory
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write the mirror file
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Atomic write failed during rename
    #[error("Atomic write failed: could not rename '{from}' to '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to encode the collection
    #[error("Failed to encode entries: {0}")]
    Encode(#[from] serde_json::Error),
}

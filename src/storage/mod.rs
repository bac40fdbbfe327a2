//! Key-value storage backends for library slots.
//!
//! A slot is a named string value. The library keeps one JSON array per slot
//! and rewrites it whole, so backends only need get/set/remove.

pub mod file;
pub mod memory;

use std::path::PathBuf;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid slot name: {0:?}")]
    InvalidKey(String),

    #[error("Failed to prepare storage directory {}: {source}", .path.display())]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error on slot {key}: {source}")]
    Io {
        key: String,
        source: std::io::Error,
    },

    #[error("Failed to persist slot {key}: {source}")]
    Persist {
        key: String,
        source: std::io::Error,
    },
}

/// Durable string slots addressed by name
pub trait KeyValueStore {
    /// Read a slot; `None` when it was never written
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace a slot's value
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a slot; removing an absent slot is not an error
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Slot names must stay a single path component on file-backed stores
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

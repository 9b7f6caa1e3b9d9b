//! Persistent key-value storage for portal state.
//!
//! This module provides the `Storage` trait, a string-keyed store with the
//! same shape as a browser's local storage, plus two implementations:
//! - `FileStorage`: JSON file on disk, survives restarts
//! - `MemoryStorage`: process-local, used by tests and when persistence is off
//!
//! The well-known keys used by the portal are defined here.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Key holding the bearer token of the current session
pub const TOKEN_KEY: &str = "token";

/// Key holding the employee's display name
pub const FULL_NAME_KEY: &str = "fullName";

/// Key holding the employee's email address
pub const EMAIL_KEY: &str = "emailAddress";

/// Key holding the last fetched payment list (JSON array)
pub const PAYMENTS_KEY: &str = "payments";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored data is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A string key-value store.
///
/// Implementations must be safe to share between the UI loop and background
/// tasks. Every operation may fail when the medium is unavailable.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

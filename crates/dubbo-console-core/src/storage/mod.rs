//! Durable key-value storage for console state.
//!
//! The console keeps exactly two string values between runs, so the storage
//! contract is deliberately the same shape as a browser's local storage:
//! string keys, string values, and removal that does not care whether the
//! key was there.
//!
//! Backends:
//! - `FileStorage`: a single JSON object file in the data directory
//! - `KeyringStorage`: one OS keychain entry per key
//! - `MemoryStorage`: process-local, nothing survives exit

pub mod file;
pub mod keychain;
pub mod memory;

use thiserror::Error;

pub use self::file::FileStorage;
pub use self::keychain::KeyringStorage;
pub use self::memory::MemoryStorage;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Keychain access failed: {0}")]
    Keychain(#[from] keyring::Error),
}

/// Synchronous string key-value storage.
///
/// Each call reads or writes a single key; implementations make a single
/// write atomic but make no promises across keys.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing a key that does not exist is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

//! Key-value storage with pluggable backends
//!
//! Stands in for the browser's origin-local storage: a flat map of string
//! keys to string values, shared by everything holding the same backend.
//!
//! # Architecture
//!
//! - `StorageBackend` trait defines the `get / set / remove` interface
//! - `MemoryStorage` keeps entries in process memory (tests, ephemeral runs)
//! - `FileStorage` keeps entries in a JSON object file on disk
//!
//! Every operation is a full read, a full overwrite or a removal of one key.
//! Concurrent writers get last-writer-wins semantics.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;

mod local;
mod memory;

pub use local::FileStorage;
pub use memory::MemoryStorage;

/// Shared handle to a storage backend
pub type SharedStorage = Arc<dyn StorageBackend>;

/// Trait for key-value storage backends
///
/// Implementations must be safe to share across threads; the web server
/// hands one backend to every request.
pub trait StorageBackend: Send + Sync {
    /// Human-readable name for this backend
    fn name(&self) -> &str;

    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Default storage file location
pub fn default_storage_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("smartexpense").join("storage.json"))
        .unwrap_or_else(|| PathBuf::from("smartexpense-storage.json"))
}

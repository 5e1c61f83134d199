//! Storage layer for the cart. Provides:
//! - The [`Storage`] interface the cart store is constructed with
//! - An in-memory backend ([`MemoryStorage`]) for tests and benches
//! - A directory-backed backend ([`FileStorage`]) used by the binary
//!
//! Values are opaque strings addressed by a string key; the cart keeps its
//! whole item list as one serialized value under a single key.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::StorageError;

/// Local persisted key-value storage.
pub trait Storage {
    /// Returns the value stored under `key`, or `None` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes the value under `key`. Removing an absent key succeeds.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

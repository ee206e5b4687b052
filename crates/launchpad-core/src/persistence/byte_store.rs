//! Byte store trait.
//!
//! Defines the flat string key-value interface that snapshots are written
//! to. Implementations live in launchpad-infra.

use std::sync::Arc;

use launchpad_types::error::StorageError;

/// Durable string key-value storage.
///
/// Synchronous: every query the session exposes is synchronous and snapshots
/// are small. Any method may fail; callers in this crate never propagate
/// those failures past the persistence adapter.
pub trait ByteStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Set a value for a key (upsert).
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key. No-op if the key does not exist.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: ByteStore + ?Sized> ByteStore for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

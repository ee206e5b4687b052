//! `ByteStore` implementations.

pub mod file;
pub mod memory;

use std::path::Path;
use std::sync::Arc;

use launchpad_core::persistence::ByteStore;
use launchpad_types::config::PersistenceConfig;

pub use file::FileByteStore;
pub use memory::MemoryByteStore;

/// Pick the byte store described by `config`.
///
/// Disabled persistence gets a fresh in-memory store; otherwise keys are
/// files under `state_dir`. `quota_bytes` applies to either.
pub fn open_store(config: &PersistenceConfig, state_dir: &Path) -> Arc<dyn ByteStore> {
    if !config.enabled {
        tracing::debug!("persistence disabled, keeping state in memory");
        let store = MemoryByteStore::new();
        return match config.quota_bytes {
            Some(quota) => Arc::new(store.with_quota(quota)),
            None => Arc::new(store),
        };
    }

    let store = FileByteStore::new(state_dir);
    match config.quota_bytes {
        Some(quota) => Arc::new(store.with_quota(quota)),
        None => Arc::new(store),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_disabled_persistence_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let config = PersistenceConfig {
            enabled: false,
            ..PersistenceConfig::default()
        };
        let store = open_store(&config, tmp.path());

        store.set_item("launchpad-progress", "{}").unwrap();

        assert_eq!(store.get_item("launchpad-progress").unwrap().as_deref(), Some("{}"));
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_quota_is_applied_to_file_store() {
        let tmp = TempDir::new().unwrap();
        let config = PersistenceConfig {
            quota_bytes: Some(8),
            ..PersistenceConfig::default()
        };
        let store = open_store(&config, tmp.path());

        let err = store.set_item("launchpad-progress", "far too long").unwrap_err();
        assert!(err.is_quota_exceeded());
        store.set_item("launchpad-progress", "{}").unwrap();
        assert!(tmp.path().join("launchpad-progress.json").exists());
    }
}

//! In-memory byte store.
//!
//! Backed by `DashMap` so clones of the store can be read and written
//! concurrently. Nothing survives the process; used for tests and when
//! `persistence.enabled = false`.

use std::sync::Arc;

use dashmap::DashMap;
use launchpad_core::persistence::ByteStore;
use launchpad_types::error::StorageError;

/// Cloning produces a shared view of the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryByteStore {
    items: Arc<DashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryByteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse single values larger than `bytes`.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }
}

impl ByteStore for MemoryByteStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).map(|v| v.value().clone()))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            if value.len() > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    bytes: value.len(),
                });
            }
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchpad_core::persistence::{PersistenceAdapter, SaveOutcome};
    use launchpad_types::config::PersistenceConfig;
    use launchpad_types::content::{ContentType, GeneratedContent};
    use launchpad_types::progress::ProgressSnapshot;

    #[test]
    fn test_clone_shares_items() {
        let store = MemoryByteStore::new();
        let view = store.clone();
        store.set_item("a", "1").unwrap();
        assert_eq!(view.get_item("a").unwrap().as_deref(), Some("1"));
        view.remove_item("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_quota_exceeded_drops_content_key() {
        let store = MemoryByteStore::new().with_quota(200);
        store.set_item("launchpad-generated-content", "[]").unwrap();
        let adapter = PersistenceAdapter::new(store.clone(), PersistenceConfig::default());

        let content = vec![GeneratedContent {
            id: uuid::Uuid::now_v7(),
            content_type: ContentType::Template,
            title: "landing".into(),
            content: serde_json::Value::String("z".repeat(400)),
            created: chrono::Utc::now(),
            metadata: None,
        }];
        let outcome = adapter.save(&ProgressSnapshot::new(), &content);

        assert!(matches!(outcome, SaveOutcome::Failed { .. }));
        assert!(store.contains_key("launchpad-progress"));
        assert!(!store.contains_key("launchpad-generated-content"));
    }
}

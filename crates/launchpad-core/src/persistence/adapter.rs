//! Best-effort snapshot persistence.
//!
//! `save` never fails: storage errors are logged and swallowed because the
//! in-memory state stays authoritative. `load` never fails either: a missing,
//! unreadable, or malformed snapshot yields an empty `RestoredState` and the
//! caller keeps its defaults.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use launchpad_types::config::PersistenceConfig;
use launchpad_types::content::GeneratedContent;
use launchpad_types::error::StorageError;
use launchpad_types::progress::ProgressSnapshot;

use super::byte_store::ByteStore;

/// What a `save` call ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Progress and content were both written.
    Saved,
    /// Progress was written; content exceeded the size limit and its key was removed.
    ContentSkipped { bytes: usize },
    /// A write failed. State in memory is unaffected.
    Failed { reason: String },
}

/// Result of a `load`. Absent fields mean "keep defaults".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoredState {
    pub progress: Option<ProgressSnapshot>,
    pub content: Option<Vec<GeneratedContent>>,
}

impl RestoredState {
    pub fn is_empty(&self) -> bool {
        self.progress.is_none() && self.content.is_none()
    }
}

/// Mirrors progress and content into a `ByteStore` under two keys.
pub struct PersistenceAdapter<S> {
    store: S,
    config: PersistenceConfig,
    last_saved: Mutex<Option<DateTime<Utc>>>,
}

impl<S: ByteStore> PersistenceAdapter<S> {
    pub fn new(store: S, config: PersistenceConfig) -> Self {
        Self {
            store,
            config,
            last_saved: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Time of the last save that wrote progress successfully.
    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        *self
            .last_saved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Write progress, then content. Never returns an error.
    pub fn save(&self, progress: &ProgressSnapshot, content: &[GeneratedContent]) -> SaveOutcome {
        match self.try_save(progress, content) {
            Ok(outcome) => {
                *self
                    .last_saved
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Utc::now());
                outcome
            }
            Err(e) => {
                if e.is_quota_exceeded() {
                    tracing::warn!(key = %self.config.content_key, "storage quota exceeded, clearing content storage");
                    if let Err(remove_err) = self.store.remove_item(&self.config.content_key) {
                        tracing::warn!("failed to clear content storage: {remove_err}");
                    }
                } else {
                    tracing::warn!("failed to save workflow state: {e}");
                }
                SaveOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn try_save(
        &self,
        progress: &ProgressSnapshot,
        content: &[GeneratedContent],
    ) -> Result<SaveOutcome, StorageError> {
        let progress_json = serde_json::to_string(progress)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set_item(&self.config.progress_key, &progress_json)?;

        let content_json = serde_json::to_string(content)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let bytes = content_json.len();
        if bytes > self.config.max_content_bytes {
            tracing::warn!(
                bytes,
                limit = self.config.max_content_bytes,
                "generated content too large, skipping content persistence"
            );
            self.store.remove_item(&self.config.content_key)?;
            return Ok(SaveOutcome::ContentSkipped { bytes });
        }

        self.store.set_item(&self.config.content_key, &content_json)?;
        tracing::debug!(
            progress_bytes = progress_json.len(),
            content_bytes = bytes,
            "saved workflow state"
        );
        Ok(SaveOutcome::Saved)
    }

    /// Read both keys in one pass. Any failure empties the whole result.
    pub fn load(&self) -> RestoredState {
        match self.try_load() {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("failed to load workflow state, using defaults: {e}");
                RestoredState::default()
            }
        }
    }

    fn try_load(&self) -> Result<RestoredState, StorageError> {
        let progress_data = self.store.get_item(&self.config.progress_key)?;
        let content_data = self.store.get_item(&self.config.content_key)?;

        let mut state = RestoredState::default();
        if let Some(data) = progress_data {
            state.progress = Some(
                serde_json::from_str(&data)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?,
            );
        }
        if let Some(data) = content_data {
            state.content = Some(
                serde_json::from_str(&data)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?,
            );
        }
        Ok(state)
    }
}

impl<S> std::fmt::Debug for PersistenceAdapter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceAdapter")
            .field("progress_key", &self.config.progress_key)
            .field("content_key", &self.config.content_key)
            .finish()
    }
}

//! Generated content ledger.
//!
//! Append/update/remove store of artifacts, in insertion order. Updates and
//! removals of unknown ids are no-ops.

use chrono::Utc;
use launchpad_types::content::{ContentPatch, ContentType, GeneratedContent, NewContent};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct ContentLedger {
    records: Vec<GeneratedContent>,
}

impl ContentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously persisted records.
    pub fn from_records(records: Vec<GeneratedContent>) -> Self {
        Self { records }
    }

    /// Append a record with a fresh id and creation timestamp.
    pub fn add(&mut self, content: NewContent) -> Uuid {
        let id = Uuid::now_v7();
        self.records.push(GeneratedContent {
            id,
            content_type: content.content_type,
            title: content.title,
            content: content.content,
            created: Utc::now(),
            metadata: content.metadata,
        });
        id
    }

    /// Merge fields into the matching record. Returns false if absent.
    pub fn update(&mut self, id: Uuid, patch: ContentPatch) -> bool {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Returns false if absent.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    pub fn get(&self, id: Uuid) -> Option<&GeneratedContent> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn list_by_type(&self, content_type: ContentType) -> Vec<&GeneratedContent> {
        self.records
            .iter()
            .filter(|r| r.content_type == content_type)
            .collect()
    }

    pub fn all(&self) -> &[GeneratedContent] {
        &self.records
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

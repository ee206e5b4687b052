//! Generated content records.
//!
//! Artifacts produced by the workflow (sitemaps, page content, templates).
//! Records are created by collaborators, updated in place by id, and never
//! expire on their own.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Kind of generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    Sitemap,
    PageContent,
    Template,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Sitemap => "sitemap",
            ContentType::PageContent => "page-content",
            ContentType::Template => "template",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sitemap" => Ok(ContentType::Sitemap),
            "page-content" | "page_content" => Ok(ContentType::PageContent),
            "template" => Ok(ContentType::Template),
            other => Err(format!("unknown content type: '{other}'")),
        }
    }
}

/// A stored artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub title: String,
    /// Opaque payload.
    pub content: Value,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// A record as supplied by a collaborator, before id and timestamp assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContent {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub title: String,
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl NewContent {
    pub fn new(content_type: ContentType, title: impl Into<String>, content: Value) -> Self {
        Self {
            content_type,
            title: title.into(),
            content,
            metadata: None,
        }
    }
}

/// Partial update merged into an existing record. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPatch {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl GeneratedContent {
    /// Merge a patch into this record. Id and creation time are never touched.
    pub fn apply(&mut self, patch: ContentPatch) {
        if let Some(content_type) = patch.content_type {
            self.content_type = content_type;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(metadata) = patch.metadata {
            self.metadata = Some(metadata);
        }
    }
}

//! Configuration types for Launchpad.
//!
//! `LaunchpadConfig` represents the top-level `config.toml` that declares the
//! task catalog, the step pipeline, persistence keys, and logging output.

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogDefinition;
use crate::step::{StepDefinition, default_steps};

/// Default storage key for the progress snapshot.
pub const DEFAULT_PROGRESS_KEY: &str = "launchpad-progress";

/// Default storage key for the generated content list.
pub const DEFAULT_CONTENT_KEY: &str = "launchpad-generated-content";

/// Content payloads larger than this are not persisted (2 MiB).
pub const DEFAULT_MAX_CONTENT_BYTES: usize = 2 * 1024 * 1024;

/// Top-level configuration.
///
/// Loaded from `~/.launchpad/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchpadConfig {
    /// Ordered sections and tasks. Defaults to the built-in site-launch catalog.
    #[serde(default)]
    pub catalog: CatalogDefinition,

    /// Executable step pipeline.
    #[serde(default = "default_steps")]
    pub steps: Vec<StepDefinition>,

    #[serde(default)]
    pub persistence: PersistenceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for LaunchpadConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogDefinition::default(),
            steps: default_steps(),
            persistence: PersistenceConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Where and how snapshots are written to the byte store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// When false, state lives in memory and nothing is written to disk.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_progress_key")]
    pub progress_key: String,
    #[serde(default = "default_content_key")]
    pub content_key: String,
    /// Serialized content above this size is skipped rather than written.
    #[serde(default = "default_max_content_bytes")]
    pub max_content_bytes: usize,
    /// Storage refuses single values above this size with `QuotaExceeded`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_bytes: Option<usize>,
}

fn default_enabled() -> bool {
    true
}

fn default_progress_key() -> String {
    DEFAULT_PROGRESS_KEY.to_string()
}

fn default_content_key() -> String {
    DEFAULT_CONTENT_KEY.to_string()
}

fn default_max_content_bytes() -> usize {
    DEFAULT_MAX_CONTENT_BYTES
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            progress_key: default_progress_key(),
            content_key: default_content_key(),
            max_content_bytes: default_max_content_bytes(),
            quota_bytes: None,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    /// Also export spans through the OpenTelemetry stdout exporter.
    #[serde(default)]
    pub otel: bool,
}

/// Formatter used by the fmt layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialize_empty_uses_defaults() {
        let config: LaunchpadConfig = toml::from_str("").unwrap();
        assert_eq!(config.catalog, CatalogDefinition::default());
        assert_eq!(config.steps.len(), 3);
        assert_eq!(config.persistence.progress_key, "launchpad-progress");
        assert_eq!(config.persistence.max_content_bytes, 2 * 1024 * 1024);
        assert!(config.persistence.enabled);
        assert_eq!(config.persistence.quota_bytes, None);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(!config.logging.otel);
    }

    #[test]
    fn test_config_deserialize_with_values() {
        let toml_str = r#"
[persistence]
content_key = "site-content"
max_content_bytes = 1024
quota_bytes = 4096
enabled = false

[logging]
format = "json"
otel = true

[[catalog.sections]]
id = "infra"
title = "Infra"

[[catalog.sections.tasks]]
id = "repo"
title = "Repository"

[[steps]]
id = "create_repo"
name = "Create repository"
command = "echo ok"
timeout_secs = 30
task = { section = "infra", task = "repo" }
"#;
        let config: LaunchpadConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.persistence.progress_key, "launchpad-progress");
        assert_eq!(config.persistence.content_key, "site-content");
        assert_eq!(config.persistence.max_content_bytes, 1024);
        assert_eq!(config.persistence.quota_bytes, Some(4096));
        assert!(!config.persistence.enabled);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.logging.otel);
        assert_eq!(config.catalog.sections.len(), 1);
        assert_eq!(config.catalog.sections[0].tasks[0].id, "repo");
        assert_eq!(config.steps.len(), 1);
        assert_eq!(config.steps[0].timeout_secs, Some(30));
        assert_eq!(config.steps[0].task.as_ref().map(|t| t.task.as_str()), Some("repo"));
    }

    #[test]
    fn test_default_impl_matches_empty_toml() {
        let parsed: LaunchpadConfig = toml::from_str("").unwrap();
        assert_eq!(parsed, LaunchpadConfig::default());
    }
}

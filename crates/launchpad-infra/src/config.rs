//! Configuration loader for Launchpad.
//!
//! Reads `config.toml` from the data directory (`~/.launchpad/` in production)
//! and deserializes it into [`LaunchpadConfig`]. Falls back to defaults when
//! the file is missing or malformed. A config that parses but describes an
//! invalid catalog or step graph is rejected by [`build_workflow`].

use std::path::Path;
use std::sync::Arc;

use launchpad_core::catalog::Catalog;
use launchpad_core::orchestrator::{GraphError, StepGraph};
use launchpad_types::config::LaunchpadConfig;
use launchpad_types::error::CatalogError;
use thiserror::Error;

use crate::filesystem::config_path;

/// Errors from turning a parsed config into a runnable workflow.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("invalid step graph: {0}")]
    Graph(#[from] GraphError),
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: defaults.
/// - Unreadable or unparsable file: a warning and defaults.
pub async fn load_config(data_dir: &Path) -> LaunchpadConfig {
    let path = config_path(data_dir);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", path.display());
            return LaunchpadConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return LaunchpadConfig::default();
        }
    };

    match toml::from_str::<LaunchpadConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            LaunchpadConfig::default()
        }
    }
}

/// Validate the catalog and the step graph against it.
pub fn build_workflow(
    config: &LaunchpadConfig,
) -> Result<(Arc<Catalog>, Arc<StepGraph>), ConfigError> {
    let catalog = Arc::new(Catalog::from_definition(config.catalog.clone())?);
    let graph = Arc::new(StepGraph::new(config.steps.clone(), &catalog)?);
    tracing::debug!(
        sections = catalog.section_count(),
        tasks = catalog.task_count(),
        steps = graph.len(),
        "workflow configuration validated"
    );
    Ok((catalog, graph))
}

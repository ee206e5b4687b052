//! Application state wiring the session and orchestrator together.
//!
//! The core types are generic over the byte store; `AppState` pins them to
//! a type-erased store picked from `[persistence]`: files under
//! `{data_dir}/state/`, or memory when persistence is disabled.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use launchpad_core::WorkflowSession;
use launchpad_core::event::EventBus;
use launchpad_core::orchestrator::StepOrchestrator;
use launchpad_core::persistence::{ByteStore, PersistenceAdapter};
use launchpad_infra::config::build_workflow;
use launchpad_infra::filesystem::state_dir;
use launchpad_infra::store::open_store;
use launchpad_infra::trigger::register_command_triggers;
use launchpad_types::config::LaunchpadConfig;

pub type ConcreteSession = WorkflowSession<Arc<dyn ByteStore>>;

/// Everything a command handler needs.
pub struct AppState {
    pub session: ConcreteSession,
    pub orchestrator: StepOrchestrator,
    /// Steps that declare no command and therefore cannot run.
    pub untriggered: Vec<String>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Validate the workflow described by `config`, restore persisted state
    /// and register command triggers.
    pub async fn init(config: &LaunchpadConfig, data_dir: PathBuf) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let (catalog, graph) = build_workflow(config).context("invalid workflow configuration")?;

        let events = EventBus::default();
        let store = open_store(&config.persistence, &state_dir(&data_dir));
        let persistence = PersistenceAdapter::new(store, config.persistence.clone());
        let session = WorkflowSession::open(catalog, persistence, events.clone());

        let mut orchestrator = StepOrchestrator::new(graph.clone()).with_events(events);
        let untriggered = register_command_triggers(&graph, &mut orchestrator)
            .context("failed to register step commands")?;

        tracing::debug!(
            data_dir = %data_dir.display(),
            steps = graph.len(),
            untriggered = untriggered.len(),
            "application state initialized"
        );

        Ok(Self {
            session,
            orchestrator,
            untriggered,
            data_dir,
        })
    }
}

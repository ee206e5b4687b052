//! Event types for the Launchpad workflow event bus.
//!
//! `WorkflowEvent` is the change notification broadcast after every state
//! mutation. All variants are Clone + Send + Sync for use with tokio
//! broadcast channels.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::ContentType;
use crate::progress::ProgressStatus;
use crate::step::StepStatus;

/// Events emitted by a workflow session and its orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    /// A task's stored status changed.
    TaskStatusChanged {
        section: String,
        task: String,
        status: ProgressStatus,
    },

    /// A step transitioned during a run.
    StepStatusChanged {
        run_id: Uuid,
        step_id: String,
        status: StepStatus,
    },

    /// An orchestrator run validated its inputs and is about to launch.
    RunStarted { run_id: Uuid, steps: Vec<String> },

    /// Every enabled step succeeded.
    RunCompleted { run_id: Uuid, duration_ms: u64 },

    /// A wave failed; later waves were left queued.
    RunFailed {
        run_id: Uuid,
        step_id: String,
        error: String,
        blocked: Vec<String>,
    },

    ContentAdded {
        id: Uuid,
        content_type: ContentType,
        title: String,
    },

    ContentUpdated { id: Uuid },

    ContentRemoved { id: Uuid },

    /// Every content record was dropped at once.
    ContentCleared { removed: usize },

    /// All tasks were reset to pending and the content ledger was cleared.
    ProgressReset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tagged_serialization() {
        let event = WorkflowEvent::TaskStatusChanged {
            section: "infrastructure".into(),
            task: "repo_creation".into(),
            status: ProgressStatus::InProgress,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "task_status_changed");
        assert_eq!(json["status"], "in-progress");

        let json = serde_json::to_value(WorkflowEvent::ProgressReset).unwrap();
        assert_eq!(json["type"], "progress_reset");

        let json = serde_json::to_value(WorkflowEvent::ContentCleared { removed: 3 }).unwrap();
        assert_eq!(json["type"], "content_cleared");
        assert_eq!(json["removed"], 3);
    }
}

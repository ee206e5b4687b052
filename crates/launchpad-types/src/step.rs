//! Executable step types.
//!
//! A step is a unit of executable work, typically bound to one catalog task,
//! with a richer runtime status than the task it reports into. Steps may
//! declare predecessors; the orchestrator only runs a dependent step once
//! every enabled predecessor has succeeded.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::ProgressStatus;

// ---------------------------------------------------------------------------
// Step Definition
// ---------------------------------------------------------------------------

/// A single step in the orchestration graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Step id (e.g. "create_repository"). Unique within a graph.
    pub id: String,
    /// Human-readable step name.
    pub name: String,
    /// Step ids that must succeed before this step may run.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Catalog task this step reports its status into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskBinding>,
    /// Shell command for command-backed triggers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Timeout enforced by command-backed triggers (the orchestrator imposes none).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Reference from a step to a catalog task, by string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskBinding {
    pub section: String,
    pub task: String,
}

impl StepDefinition {
    /// Create a root step with no task binding.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            depends_on: Vec::new(),
            task: None,
            command: None,
            timeout_secs: None,
        }
    }

    /// Declare predecessor steps.
    pub fn depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Bind the step to a catalog task.
    pub fn bound_to(mut self, section: impl Into<String>, task: impl Into<String>) -> Self {
        self.task = Some(TaskBinding {
            section: section.into(),
            task: task.into(),
        });
        self
    }

    /// Whether this step declares any predecessors.
    pub fn is_root(&self) -> bool {
        self.depends_on.is_empty()
    }
}

/// The default infrastructure pipeline.
///
/// Repository creation and subdomain copy run concurrently; cloud
/// provisioning waits for both.
pub fn default_steps() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new("create_repository", "Create GitHub repository")
            .bound_to("infrastructure", "repo_creation"),
        StepDefinition::new("copy_subdomain", "Copy template subdomain"),
        StepDefinition::new("provision_cloud", "Provision cloud resources")
            .depends_on(["create_repository", "copy_subdomain"])
            .bound_to("infrastructure", "aws_provisioning"),
    ]
}

// ---------------------------------------------------------------------------
// Runtime status
// ---------------------------------------------------------------------------

/// Runtime status of a step: `idle -> queued -> running -> {success | error}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Idle,
    /// Waiting on a join over predecessors. Still queued after a failed run
    /// means the step was blocked by an upstream failure.
    Queued,
    Running,
    Success,
    Error,
}

impl StepStatus {
    /// Project onto the coarser progress vocabulary.
    pub fn as_progress(&self) -> ProgressStatus {
        match self {
            StepStatus::Idle | StepStatus::Queued => ProgressStatus::Pending,
            StepStatus::Running => ProgressStatus::InProgress,
            StepStatus::Success => ProgressStatus::Completed,
            StepStatus::Error => ProgressStatus::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Idle => "idle",
            StepStatus::Queued => "queued",
            StepStatus::Running => "running",
            StepStatus::Success => "success",
            StepStatus::Error => "error",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime record of a step: status plus the outcome of its last execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub status: StepStatus,
    /// Payload the trigger resolved with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    /// Failure detail the trigger rejected with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_onto_progress() {
        assert_eq!(StepStatus::Idle.as_progress(), ProgressStatus::Pending);
        assert_eq!(StepStatus::Queued.as_progress(), ProgressStatus::Pending);
        assert_eq!(StepStatus::Running.as_progress(), ProgressStatus::InProgress);
        assert_eq!(StepStatus::Success.as_progress(), ProgressStatus::Completed);
        assert_eq!(StepStatus::Error.as_progress(), ProgressStatus::Error);
    }

    #[test]
    fn test_default_steps_shape() {
        let steps = default_steps();
        assert_eq!(steps.len(), 3);
        assert!(steps[0].is_root());
        assert!(steps[1].is_root());
        assert_eq!(steps[2].depends_on, vec!["create_repository", "copy_subdomain"]);
        assert_eq!(
            steps[2].task,
            Some(TaskBinding {
                section: "infrastructure".into(),
                task: "aws_provisioning".into()
            })
        );
    }

    #[test]
    fn test_step_definition_toml_defaults() {
        let json = r#"{"id":"a","name":"A"}"#;
        let step: StepDefinition = serde_json::from_str(json).unwrap();
        assert!(step.depends_on.is_empty());
        assert!(step.task.is_none());
        assert!(step.command.is_none());
    }
}

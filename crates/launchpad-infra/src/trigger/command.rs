//! Shell-command step triggers.
//!
//! A `CommandTrigger` runs a step's configured command through `sh -c`.
//! Exit status 0 resolves with stdout parsed as JSON (or as a plain string
//! when it is not JSON); any other status rejects with stderr. The optional
//! per-step timeout is enforced here, not by the orchestrator.

use std::process::Stdio;
use std::time::Duration;

use launchpad_core::orchestrator::{StepGraph, StepOrchestrator, StepTrigger, TriggerError};
use launchpad_core::orchestrator::{BoxStepTrigger, OrchestratorError};
use launchpad_types::step::StepDefinition;
use serde_json::Value;
use tokio::process::Command;

/// Environment variable carrying the step id into the command.
pub const STEP_ID_ENV: &str = "LAUNCHPAD_STEP_ID";

#[derive(Debug, Clone)]
pub struct CommandTrigger {
    step_id: String,
    command: String,
    timeout: Option<Duration>,
}

impl CommandTrigger {
    pub fn new(step_id: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            command: command.into(),
            timeout: None,
        }
    }

    /// Build from a step definition. `None` if the step declares no command.
    pub fn from_step(step: &StepDefinition) -> Option<Self> {
        let command = step.command.as_ref()?;
        let mut trigger = Self::new(step.id.clone(), command.clone());
        trigger.timeout = step.timeout_secs.map(Duration::from_secs);
        Some(trigger)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn execute(&self) -> Result<Value, TriggerError> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&self.command)
            .env(STEP_ID_ENV, &self.step_id)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        tracing::debug!(step_id = %self.step_id, command = %self.command, "spawning step command");

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| TriggerError::TimedOut(limit))?,
            None => cmd.output().await,
        }
        .map_err(|e| TriggerError::Launch(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                match output.status.code() {
                    Some(code) => format!("command exited with status {code}"),
                    None => "command terminated by signal".to_string(),
                }
            } else {
                stderr
            };
            return Err(TriggerError::Failed(message));
        }

        Ok(parse_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl StepTrigger for CommandTrigger {
    fn trigger(&self) -> impl Future<Output = Result<Value, TriggerError>> + Send {
        self.execute()
    }
}

/// JSON if stdout parses as JSON, a string otherwise, null when empty.
pub fn parse_output(stdout: &str) -> Value {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}

/// Register a `CommandTrigger` for every step that declares a command.
///
/// Returns the ids of steps left without a trigger.
pub fn register_command_triggers(
    graph: &StepGraph,
    orchestrator: &mut StepOrchestrator,
) -> Result<Vec<String>, OrchestratorError> {
    let mut missing = Vec::new();
    for step in graph.steps() {
        match CommandTrigger::from_step(&step.definition) {
            Some(trigger) => orchestrator.register(step.id(), BoxStepTrigger::new(trigger))?,
            None => missing.push(step.id().to_string()),
        }
    }
    Ok(missing)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use launchpad_core::catalog::Catalog;
    use serde_json::json;

    #[test]
    fn test_parse_output() {
        assert_eq!(parse_output(""), Value::Null);
        assert_eq!(parse_output(" {\"url\": \"x\"}\n"), json!({"url": "x"}));
        assert_eq!(parse_output("created repo\n"), json!("created repo"));
    }

    #[tokio::test]
    async fn success_parses_stdout() {
        let trigger = CommandTrigger::new("s", r#"echo '{"bucket":"site"}'"#);
        let value = trigger.trigger().await.unwrap();
        assert_eq!(value, json!({"bucket": "site"}));
    }

    #[tokio::test]
    async fn step_id_is_exported() {
        let trigger = CommandTrigger::new("copy_subdomain", "printf %s \"$LAUNCHPAD_STEP_ID\"");
        assert_eq!(trigger.trigger().await.unwrap(), json!("copy_subdomain"));
    }

    #[tokio::test]
    async fn failure_reports_stderr() {
        let trigger = CommandTrigger::new("s", "echo 'repository already exists' >&2; exit 3");
        let err = trigger.trigger().await.unwrap_err();
        assert_eq!(err, TriggerError::Failed("repository already exists".into()));
    }

    #[tokio::test]
    async fn failure_without_stderr_reports_status() {
        let trigger = CommandTrigger::new("s", "exit 7");
        let err = trigger.trigger().await.unwrap_err();
        assert_eq!(err.to_string(), "command exited with status 7");
    }

    #[tokio::test]
    async fn timeout_is_enforced() {
        let trigger = CommandTrigger::new("s", "sleep 5").with_timeout(Duration::from_millis(100));
        let err = trigger.trigger().await.unwrap_err();
        assert_eq!(err, TriggerError::TimedOut(Duration::from_millis(100)));
        assert_eq!(err.to_string(), "timed out after 100ms");
    }

    #[test]
    fn registers_only_steps_with_commands() {
        let steps = vec![
            StepDefinition {
                command: Some("true".into()),
                ..StepDefinition::new("a", "A")
            },
            StepDefinition::new("b", "B"),
        ];
        let graph = Arc::new(StepGraph::new(steps, &Catalog::default()).unwrap());
        let mut orch = StepOrchestrator::new(graph.clone());

        let missing = register_command_triggers(&graph, &mut orch).unwrap();

        assert_eq!(missing, vec!["b"]);
        assert!(orch.has_trigger("a"));
        assert!(!orch.has_trigger("b"));
    }
}

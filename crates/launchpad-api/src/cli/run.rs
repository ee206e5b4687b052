//! Step commands: list the configured pipeline and run it.

use std::time::Duration;

use anyhow::{Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::broadcast::error::RecvError;

use launchpad_core::orchestrator::OrchestratorError;
use launchpad_infra::filesystem::config_path;
use launchpad_types::event::WorkflowEvent;
use launchpad_types::step::StepStatus;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// Print the step graph grouped into execution waves.
pub fn list_steps(state: &AppState, json: bool) -> Result<()> {
    let graph = state.orchestrator.graph();

    if json {
        let out: Vec<_> = graph
            .steps()
            .iter()
            .map(|s| {
                serde_json::json!({
                    "id": s.id(),
                    "name": s.definition.name,
                    "wave": s.depth,
                    "depends_on": s.definition.depends_on,
                    "task": s.definition.task,
                    "command": s.definition.command,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Wave").fg(Color::Cyan),
            Cell::new("Step"),
            Cell::new("Depends on"),
            Cell::new("Task"),
            Cell::new("Command"),
        ]);

    for (wave, steps) in graph.waves().enumerate() {
        for step in steps {
            let task = step
                .definition
                .task
                .as_ref()
                .map(|b| format!("{}/{}", b.section, b.task))
                .unwrap_or_else(|| "-".to_string());
            let command = match &step.definition.command {
                Some(cmd) => Cell::new(cmd),
                None => Cell::new("not set").fg(Color::DarkGrey),
            };
            table.add_row(vec![
                Cell::new(wave),
                Cell::new(step.id()),
                Cell::new(step.definition.depends_on.join(", ")),
                Cell::new(task),
                command,
            ]);
        }
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Run the selected steps, streaming transitions from the event bus.
pub async fn run_steps(
    state: &AppState,
    steps: Vec<String>,
    all: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let graph = state.orchestrator.graph();
    let enabled: Vec<String> = if all {
        graph.steps().iter().map(|s| s.id().to_string()).collect()
    } else {
        steps
    };

    if let Some(id) = enabled.iter().find(|id| state.untriggered.contains(*id)) {
        bail!(
            "step '{id}' has no command; set `command` for it under [[steps]] in {}",
            config_path(&state.data_dir).display()
        );
    }

    let spinner = if json || quiet {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
        spinner.set_message("Starting run...");
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    };

    let mut events = state.session.events().subscribe();
    let bar = spinner.clone();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(WorkflowEvent::StepStatusChanged {
                    step_id, status, ..
                }) => match status {
                    StepStatus::Running => bar.set_message(format!("Running {step_id}...")),
                    StepStatus::Success => {
                        bar.println(format!("  {} {step_id}", style("✓").green()))
                    }
                    StepStatus::Error => bar.println(format!("  {} {step_id}", style("✗").red())),
                    StepStatus::Idle | StepStatus::Queued => {}
                },
                Ok(WorkflowEvent::RunCompleted { .. } | WorkflowEvent::RunFailed { .. }) => break,
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    });

    let result = state.session.run_steps(&state.orchestrator, &enabled).await;

    match &result {
        // Rejected before launch: no terminal run event will arrive.
        Err(OrchestratorError::UnknownStep(_) | OrchestratorError::MissingTrigger(_)) => {
            printer.abort()
        }
        _ => {
            let _ = printer.await;
        }
    }
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }
            if !quiet {
                println!();
                println!(
                    "  {} Run {} finished in {}ms",
                    style("*").green().bold(),
                    style(short_id(&report.run_id.to_string())).cyan(),
                    report.duration_ms
                );
                println!();
            }
            Ok(())
        }
        Err(OrchestratorError::StepFailed {
            run_id,
            step_id,
            error,
            blocked,
        }) => {
            if json {
                let out = serde_json::json!({
                    "run_id": run_id,
                    "failed_step": step_id,
                    "error": error,
                    "blocked": blocked,
                    "statuses": state.orchestrator.statuses(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else if !quiet {
                println!();
                if let Some(record) = state.orchestrator.record(&step_id) {
                    if let Some(err) = record.error {
                        println!("  Error: {}", style(err).red());
                    }
                }
                if !blocked.is_empty() {
                    println!(
                        "  Not started: {}",
                        style(blocked.join(", ")).yellow()
                    );
                }
                println!();
            }
            bail!("run {} failed at step '{step_id}': {error}", short_id(&run_id.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

fn short_id(id: &str) -> &str {
    &id[..8.min(id.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchpad_types::config::LaunchpadConfig;
    use launchpad_types::progress::ProgressStatus;
    use launchpad_types::step::StepDefinition;
    use tempfile::TempDir;

    fn step(id: &str, command: &str) -> StepDefinition {
        StepDefinition {
            command: Some(command.to_string()),
            ..StepDefinition::new(id, id)
        }
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0192f3a4-aaaa"), "0192f3a4");
        assert_eq!(short_id("abc"), "abc");
    }

    #[tokio::test]
    async fn test_run_without_command_is_refused() {
        let tmp = TempDir::new().unwrap();
        let state = AppState::init(&LaunchpadConfig::default(), tmp.path().to_path_buf())
            .await
            .unwrap();

        let err = run_steps(&state, vec![], true, true, true).await.unwrap_err();
        assert!(err.to_string().contains("has no command"));
        assert!(!state.session.is_processing());
    }

    #[tokio::test]
    async fn test_run_marks_bound_task() {
        let tmp = TempDir::new().unwrap();
        let config = LaunchpadConfig {
            steps: vec![
                step("create_repository", "true").bound_to("infrastructure", "repo_creation"),
                step("copy_subdomain", "echo copied"),
            ],
            ..LaunchpadConfig::default()
        };
        let state = AppState::init(&config, tmp.path().to_path_buf()).await.unwrap();

        run_steps(&state, vec![], true, true, true).await.unwrap();

        let task = state.session.catalog().task("infrastructure", "repo_creation").unwrap();
        assert_eq!(state.session.task_status(task), ProgressStatus::Completed);
        assert_eq!(state.orchestrator.status("copy_subdomain"), Some(StepStatus::Success));
    }

    #[tokio::test]
    async fn test_failed_run_sets_session_error() {
        let tmp = TempDir::new().unwrap();
        let config = LaunchpadConfig {
            steps: vec![
                step("a", "echo boom >&2; exit 1"),
                step("b", "true").depends_on(["a"]),
            ],
            ..LaunchpadConfig::default()
        };
        let state = AppState::init(&config, tmp.path().to_path_buf()).await.unwrap();

        let err = run_steps(&state, vec![], true, true, true).await.unwrap_err();

        assert!(err.to_string().contains("boom"));
        assert!(state.session.error().is_some());
        assert_eq!(state.orchestrator.status("b"), Some(StepStatus::Queued));
    }
}

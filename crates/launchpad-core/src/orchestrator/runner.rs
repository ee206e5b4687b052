//! Wave-based step execution with per-step failure isolation.
//!
//! The `StepOrchestrator` runs enabled steps of a `StepGraph` wave by wave.
//! Steps within a wave run concurrently via `tokio::JoinSet`; the next wave
//! launches only after every step of the current one has settled.
//!
//! # Execution flow
//!
//! 1. Validate the enabled ids (known step, registered trigger).
//! 2. Reset included steps to `idle`, then mark every included dependent `queued`.
//! 3. For each wave, launch its enabled steps (`running`) and await them all.
//! 4. Settle each step to `success` or `error`; a failed step never cancels
//!    its siblings.
//! 5. If any step of the wave failed, stop: later waves stay `queued` and the
//!    run rejects with the first failure in declaration order.
//!
//! Every transition of a task-bound step is pushed into a `ProgressSink`.
//! Callers must not start a run while another is outstanding on the same
//! orchestrator.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use launchpad_types::event::WorkflowEvent;
use launchpad_types::step::{StepRecord, StepStatus};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::event::EventBus;

use super::graph::{GraphStep, StepGraph};
use super::sink::ProgressSink;
use super::trigger::{BoxStepTrigger, TriggerError};

// ---------------------------------------------------------------------------
// Errors and results
// ---------------------------------------------------------------------------

/// Errors from an orchestrator run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error("unknown step '{0}'")]
    UnknownStep(String),

    #[error("no trigger registered for step '{0}'")]
    MissingTrigger(String),

    /// A wave failed. `blocked` lists the enabled steps left `queued`.
    #[error("step '{step_id}' failed: {error}")]
    StepFailed {
        run_id: Uuid,
        step_id: String,
        error: String,
        blocked: Vec<String>,
    },
}

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub statuses: BTreeMap<String, StepStatus>,
    /// Payloads of the steps that ran in this invocation.
    pub outputs: BTreeMap<String, Value>,
    pub duration_ms: u64,
}

/// Outcome of one spawned step.
struct Settled {
    order: usize,
    result: Result<Value, TriggerError>,
    completed_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// StepOrchestrator
// ---------------------------------------------------------------------------

/// Executes a validated step graph with injected triggers.
pub struct StepOrchestrator {
    graph: Arc<StepGraph>,
    triggers: HashMap<String, BoxStepTrigger>,
    records: Mutex<BTreeMap<String, StepRecord>>,
    events: Option<EventBus>,
}

impl StepOrchestrator {
    /// Every step starts `idle` with no triggers registered.
    pub fn new(graph: Arc<StepGraph>) -> Self {
        let records = graph
            .steps()
            .iter()
            .map(|s| (s.id().to_string(), StepRecord::default()))
            .collect();
        Self {
            graph,
            triggers: HashMap::new(),
            records: Mutex::new(records),
            events: None,
        }
    }

    /// Publish step and run events to this bus.
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Attach the action for a step, replacing any previous one.
    pub fn register(
        &mut self,
        step_id: &str,
        trigger: BoxStepTrigger,
    ) -> Result<(), OrchestratorError> {
        if !self.graph.contains(step_id) {
            return Err(OrchestratorError::UnknownStep(step_id.to_string()));
        }
        self.triggers.insert(step_id.to_string(), trigger);
        Ok(())
    }

    pub fn graph(&self) -> &StepGraph {
        &self.graph
    }

    pub fn has_trigger(&self, step_id: &str) -> bool {
        self.triggers.contains_key(step_id)
    }

    pub fn record(&self, step_id: &str) -> Option<StepRecord> {
        self.lock_records().get(step_id).cloned()
    }

    pub fn status(&self, step_id: &str) -> Option<StepStatus> {
        self.lock_records().get(step_id).map(|r| r.status)
    }

    /// Current status of every step.
    pub fn statuses(&self) -> BTreeMap<String, StepStatus> {
        self.lock_records()
            .iter()
            .map(|(id, r)| (id.clone(), r.status))
            .collect()
    }

    /// Steps currently `queued`, in declaration order. After a run settles
    /// these are the steps blocked by an upstream failure.
    pub fn blocked_steps(&self) -> Vec<String> {
        let records = self.lock_records();
        self.graph
            .steps()
            .iter()
            .filter(|s| records.get(s.id()).is_some_and(|r| r.status == StepStatus::Queued))
            .map(|s| s.id().to_string())
            .collect()
    }

    /// Run every declared step.
    pub async fn run_all(&self, sink: &dyn ProgressSink) -> Result<RunReport, OrchestratorError> {
        let ids: Vec<String> = self.graph.steps().iter().map(|s| s.id().to_string()).collect();
        self.run(ids, sink).await
    }

    /// Run the enabled steps. Disabled steps stay untouched and count as
    /// satisfied predecessors.
    pub async fn run<I, S>(
        &self,
        enabled: I,
        sink: &dyn ProgressSink,
    ) -> Result<RunReport, OrchestratorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut requested = HashSet::new();
        for id in enabled {
            let id = id.as_ref();
            if !self.graph.contains(id) {
                return Err(OrchestratorError::UnknownStep(id.to_string()));
            }
            if !self.triggers.contains_key(id) {
                return Err(OrchestratorError::MissingTrigger(id.to_string()));
            }
            requested.insert(id.to_string());
        }

        let included: Vec<&GraphStep> = self
            .graph
            .steps()
            .iter()
            .filter(|s| requested.contains(s.id()))
            .collect();

        let run_id = Uuid::now_v7();
        let started = Instant::now();
        tracing::info!(run_id = %run_id, steps = included.len(), "starting step run");
        self.publish(WorkflowEvent::RunStarted {
            run_id,
            steps: included.iter().map(|s| s.id().to_string()).collect(),
        });

        for step in &included {
            self.transition(run_id, step, sink, |r| *r = StepRecord::default());
        }
        for step in included.iter().filter(|s| !s.is_root()) {
            self.transition(run_id, step, sink, |r| r.status = StepStatus::Queued);
        }

        let mut outputs = BTreeMap::new();
        for (wave_idx, wave) in self.graph.waves().enumerate() {
            let cohort: Vec<&GraphStep> = wave
                .into_iter()
                .filter(|s| requested.contains(s.id()))
                .collect();
            if cohort.is_empty() {
                continue;
            }

            tracing::debug!(
                run_id = %run_id,
                wave = wave_idx,
                steps = cohort.len(),
                "launching wave"
            );

            let mut join_set = JoinSet::new();
            let mut in_flight: BTreeMap<usize, &GraphStep> = BTreeMap::new();
            for step in cohort {
                let Some(trigger) = self.triggers.get(step.id()).cloned() else {
                    continue;
                };
                self.transition(run_id, step, sink, |r| {
                    r.status = StepStatus::Running;
                    r.started_at = Some(Utc::now());
                });
                in_flight.insert(step.order, step);

                let order = step.order;
                join_set.spawn(async move {
                    let result = AssertUnwindSafe(trigger.trigger())
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|_| Err(TriggerError::Panicked));
                    Settled {
                        order,
                        result,
                        completed_at: Utc::now(),
                    }
                });
            }

            // (declaration order, step id, error)
            let mut failures: Vec<(usize, String, String)> = Vec::new();
            while let Some(joined) = join_set.join_next().await {
                let settled = match joined {
                    Ok(settled) => settled,
                    Err(e) => {
                        tracing::warn!(run_id = %run_id, "step task did not complete: {e}");
                        continue;
                    }
                };
                let Some(step) = in_flight.remove(&settled.order) else {
                    continue;
                };
                match settled.result {
                    Ok(output) => {
                        tracing::debug!(run_id = %run_id, step_id = step.id(), "step succeeded");
                        self.transition(run_id, step, sink, |r| {
                            r.status = StepStatus::Success;
                            r.output = Some(output.clone());
                            r.completed_at = Some(settled.completed_at);
                        });
                        outputs.insert(step.id().to_string(), output);
                    }
                    Err(e) => {
                        let error = e.to_string();
                        tracing::warn!(run_id = %run_id, step_id = step.id(), "step failed: {error}");
                        self.transition(run_id, step, sink, |r| {
                            r.status = StepStatus::Error;
                            r.error = Some(error.clone());
                            r.completed_at = Some(settled.completed_at);
                        });
                        failures.push((step.order, step.id().to_string(), error));
                    }
                }
            }

            // Anything still in flight was lost by the runtime.
            for (order, step) in in_flight {
                let error = "step task did not complete".to_string();
                self.transition(run_id, step, sink, |r| {
                    r.status = StepStatus::Error;
                    r.error = Some(error.clone());
                    r.completed_at = Some(Utc::now());
                });
                failures.push((order, step.id().to_string(), error));
            }

            if let Some((_, step_id, error)) = failures.into_iter().min_by_key(|f| f.0) {
                let blocked: Vec<String> = included
                    .iter()
                    .filter(|s| s.depth > wave_idx)
                    .map(|s| s.id().to_string())
                    .collect();
                tracing::warn!(
                    run_id = %run_id,
                    step_id = step_id.as_str(),
                    blocked = blocked.len(),
                    "step run failed"
                );
                self.publish(WorkflowEvent::RunFailed {
                    run_id,
                    step_id: step_id.clone(),
                    error: error.clone(),
                    blocked: blocked.clone(),
                });
                return Err(OrchestratorError::StepFailed {
                    run_id,
                    step_id,
                    error,
                    blocked,
                });
            }
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        tracing::info!(run_id = %run_id, duration_ms, "step run completed");
        self.publish(WorkflowEvent::RunCompleted {
            run_id,
            duration_ms,
        });

        Ok(RunReport {
            run_id,
            statuses: self.statuses(),
            outputs,
            duration_ms,
        })
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn transition(
        &self,
        run_id: Uuid,
        step: &GraphStep,
        sink: &dyn ProgressSink,
        update: impl FnOnce(&mut StepRecord),
    ) {
        let status = {
            let mut records = self.lock_records();
            let record = records.entry(step.id().to_string()).or_default();
            update(record);
            record.status
        };
        tracing::debug!(run_id = %run_id, step_id = step.id(), status = %status, "step transition");

        if let Some(task) = step.task {
            sink.update_task_status(task, status.as_progress());
        }
        self.publish(WorkflowEvent::StepStatusChanged {
            run_id,
            step_id: step.id().to_string(),
            status,
        });
    }

    fn publish(&self, event: WorkflowEvent) {
        if let Some(events) = &self.events {
            events.publish(event);
        }
    }

    fn lock_records(&self) -> MutexGuard<'_, BTreeMap<String, StepRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for StepOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepOrchestrator")
            .field("steps", &self.graph.len())
            .field("triggers", &self.triggers.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

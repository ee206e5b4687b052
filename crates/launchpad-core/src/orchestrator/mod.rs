//! Step orchestration.
//!
//! - `graph`: step DAG validation and wave computation
//! - `trigger`: the injected async action per step
//! - `sink`: where step transitions are projected into task progress
//! - `runner`: the wave executor

pub mod graph;
pub mod runner;
pub mod sink;
pub mod trigger;

pub use graph::{GraphError, GraphStep, StepGraph};
pub use runner::{OrchestratorError, RunReport, StepOrchestrator};
pub use sink::ProgressSink;
pub use trigger::{BoxStepTrigger, StepTrigger, TriggerError, trigger_fn};

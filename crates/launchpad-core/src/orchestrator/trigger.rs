//! Step triggers: the async action a collaborator supplies for each step.
//!
//! `StepTrigger` uses RPITIT and therefore cannot be a trait object. The
//! object-safe `StepTriggerDyn` has a blanket impl for every `StepTrigger`,
//! and `BoxStepTrigger` wraps it for storage in the orchestrator.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Errors a trigger may reject with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    #[error("{0}")]
    Failed(String),

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("failed to launch: {0}")]
    Launch(String),

    #[error("trigger panicked")]
    Panicked,
}

impl TriggerError {
    pub fn failed(message: impl Into<String>) -> Self {
        TriggerError::Failed(message.into())
    }
}

/// An externally supplied action run once per step per orchestrator run.
///
/// Resolves with a result payload or rejects with a failure detail.
pub trait StepTrigger: Send + Sync {
    fn trigger(&self) -> impl Future<Output = Result<Value, TriggerError>> + Send;
}

/// Object-safe version of [`StepTrigger`] with boxed futures.
pub trait StepTriggerDyn: Send + Sync {
    fn trigger_boxed<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Value, TriggerError>> + Send + 'a>>;
}

impl<T: StepTrigger> StepTriggerDyn for T {
    fn trigger_boxed<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Value, TriggerError>> + Send + 'a>> {
        Box::pin(self.trigger())
    }
}

/// Type-erased, cheaply cloneable trigger.
#[derive(Clone)]
pub struct BoxStepTrigger {
    inner: Arc<dyn StepTriggerDyn>,
}

impl BoxStepTrigger {
    pub fn new<T: StepTrigger + 'static>(trigger: T) -> Self {
        Self {
            inner: Arc::new(trigger),
        }
    }

    pub async fn trigger(&self) -> Result<Value, TriggerError> {
        self.inner.trigger_boxed().await
    }
}

impl std::fmt::Debug for BoxStepTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxStepTrigger").finish_non_exhaustive()
    }
}

/// Adapter turning an async closure into a [`StepTrigger`].
pub struct FnTrigger<F> {
    f: F,
}

impl<F, Fut> StepTrigger for FnTrigger<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, TriggerError>> + Send,
{
    fn trigger(&self) -> impl Future<Output = Result<Value, TriggerError>> + Send {
        (self.f)()
    }
}

/// Box an async closure as a step trigger.
///
/// ```ignore
/// let trigger = trigger_fn(|| async { Ok(serde_json::json!({"repo": "site"})) });
/// ```
pub fn trigger_fn<F, Fut>(f: F) -> BoxStepTrigger
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, TriggerError>> + Send + 'static,
{
    BoxStepTrigger::new(FnTrigger { f })
}

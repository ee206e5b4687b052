//! Where the orchestrator pushes its coarse progress projection.

use std::sync::Mutex;

use launchpad_types::progress::ProgressStatus;

use crate::catalog::TaskRef;
use crate::progress::ProgressStore;

/// Receives the task-level projection of every step transition.
///
/// Only steps bound to a catalog task report here.
pub trait ProgressSink: Send + Sync {
    fn update_task_status(&self, task: TaskRef, status: ProgressStatus);
}

/// Discards every update.
impl ProgressSink for () {
    fn update_task_status(&self, _task: TaskRef, _status: ProgressStatus) {}
}

impl ProgressSink for Mutex<ProgressStore> {
    fn update_task_status(&self, task: TaskRef, status: ProgressStatus) {
        self.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .update_task_status(task, status);
    }
}

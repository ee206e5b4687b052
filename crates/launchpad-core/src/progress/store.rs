//! In-memory progress tree.
//!
//! `ProgressStore` owns one status per catalog task and derives everything
//! else on demand. It performs no I/O; change notification and persistence
//! are layered on top by `WorkflowSession`.

use std::sync::Arc;

use launchpad_types::progress::{ProgressSnapshot, ProgressStatus};
use serde::Serialize;

use crate::catalog::{Catalog, SectionRef, TaskRef};

use super::aggregate::{aggregate_status, percent};

/// The first task that still needs work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextTask {
    #[serde(skip)]
    pub task: TaskRef,
    pub section_id: String,
    pub task_id: String,
    pub section_title: String,
    pub task_title: String,
}

/// Section -> task -> status, shaped by a validated catalog.
///
/// Every `TaskRef`/`SectionRef` passed in must come from `self.catalog()`.
/// Handles from another catalog are a programming error and panic.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    catalog: Arc<Catalog>,
    statuses: Vec<Vec<ProgressStatus>>,
}

impl ProgressStore {
    /// All tasks start pending.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let statuses = catalog
            .sections()
            .map(|s| vec![ProgressStatus::Pending; catalog.tasks(s).count()])
            .collect();
        Self { catalog, statuses }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Overwrite a task's status. Returns whether the stored value changed.
    pub fn update_task_status(&mut self, task: TaskRef, status: ProgressStatus) -> bool {
        self.assert_owned_task(task);
        let (section, idx) = task.indices();
        let slot = &mut self.statuses[section][idx];
        if *slot == status {
            return false;
        }
        *slot = status;
        true
    }

    pub fn task_status(&self, task: TaskRef) -> ProgressStatus {
        self.assert_owned_task(task);
        let (section, idx) = task.indices();
        self.statuses[section][idx]
    }

    /// Derived status of a section. Never stored.
    pub fn section_status(&self, section: SectionRef) -> ProgressStatus {
        debug_assert!(
            self.catalog.owns_section(section),
            "section handle {section:?} does not belong to this catalog"
        );
        aggregate_status(&self.statuses[section.position()])
    }

    /// Integer percent of completed tasks across the whole catalog.
    pub fn overall_progress(&self) -> u8 {
        let total = self.statuses.iter().map(Vec::len).sum();
        let completed = self
            .statuses
            .iter()
            .flatten()
            .filter(|s| **s == ProgressStatus::Completed)
            .count();
        percent(completed, total)
    }

    /// Scan sections in order, skipping completed ones, for the first task
    /// that is not completed.
    pub fn next_incomplete_task(&self) -> Option<NextTask> {
        for section in self.catalog.sections() {
            if self.section_status(section) == ProgressStatus::Completed {
                continue;
            }
            let task = self
                .catalog
                .tasks(section)
                .find(|t| self.task_status(*t) != ProgressStatus::Completed)?;
            let section_def = self.catalog.section_def(section);
            let task_def = self.catalog.task_def(task);
            return Some(NextTask {
                task,
                section_id: section_def.id.clone(),
                task_id: task_def.id.clone(),
                section_title: section_def.title.clone(),
                task_title: task_def.title.clone(),
            });
        }
        None
    }

    /// Reset every task to pending.
    pub fn reset(&mut self) {
        for status in self.statuses.iter_mut().flatten() {
            *status = ProgressStatus::Pending;
        }
    }

    /// Persisted form of the tree.
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.catalog
            .sections()
            .map(|section| {
                let tasks = self
                    .catalog
                    .tasks(section)
                    .map(|t| (self.catalog.task_id(t).to_string(), self.task_status(t)))
                    .collect();
                (self.catalog.section_id(section).to_string(), tasks)
            })
            .collect()
    }

    /// Merge a snapshot over the current state.
    ///
    /// Known ids are applied; unknown section or task ids are ignored; ids
    /// absent from the snapshot keep their current value.
    pub fn restore(&mut self, snapshot: &ProgressSnapshot) {
        for (section_id, tasks) in snapshot {
            for (task_id, status) in tasks {
                match self.catalog.task(section_id, task_id) {
                    Ok(task) => {
                        self.update_task_status(task, *status);
                    }
                    Err(e) => {
                        tracing::debug!(section = %section_id, task = %task_id, "ignoring snapshot entry: {e}");
                    }
                }
            }
        }
    }

    fn assert_owned_task(&self, task: TaskRef) {
        debug_assert!(
            self.catalog.owns_task(task),
            "task handle {task:?} does not belong to this catalog"
        );
    }
}

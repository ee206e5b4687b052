//! The explicit workflow store object.
//!
//! `WorkflowSession` owns the progress tree, the content ledger, the active
//! section, and the processing/error flags. It is constructed once at startup
//! from a persistence adapter (restoring whatever snapshot is there) and
//! passed to whoever needs it. Every mutation is mirrored to storage and
//! announced on the event bus.
//!
//! Cloning produces a shared view (backed by `Arc<...>`).

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use launchpad_types::content::{ContentPatch, ContentType, GeneratedContent, NewContent};
use launchpad_types::event::WorkflowEvent;
use launchpad_types::progress::{ProgressSnapshot, ProgressStatus};
use uuid::Uuid;

use crate::catalog::{Catalog, SectionRef, TaskRef};
use crate::event::EventBus;
use crate::ledger::ContentLedger;
use crate::navigation::{self, NavigationError};
use crate::orchestrator::{OrchestratorError, ProgressSink, RunReport, StepOrchestrator};
use crate::persistence::{ByteStore, PersistenceAdapter, SaveOutcome};
use crate::progress::{NextTask, ProgressStore};

struct SessionState {
    progress: ProgressStore,
    ledger: ContentLedger,
    active: SectionRef,
    is_processing: bool,
    error: Option<String>,
}

struct SessionInner<S> {
    catalog: Arc<Catalog>,
    state: Mutex<SessionState>,
    persistence: PersistenceAdapter<S>,
    events: EventBus,
}

pub struct WorkflowSession<S> {
    inner: Arc<SessionInner<S>>,
}

impl<S> Clone for WorkflowSession<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ByteStore> WorkflowSession<S> {
    /// Build a session, merging any persisted snapshot over all-pending defaults.
    pub fn open(catalog: Arc<Catalog>, persistence: PersistenceAdapter<S>, events: EventBus) -> Self {
        let restored = persistence.load();
        let mut progress = ProgressStore::new(catalog.clone());
        if let Some(snapshot) = &restored.progress {
            progress.restore(snapshot);
        }
        let ledger = restored
            .content
            .map(ContentLedger::from_records)
            .unwrap_or_default();
        tracing::debug!(
            restored_progress = restored.progress.is_some(),
            content_records = ledger.len(),
            "opened workflow session"
        );

        Self {
            inner: Arc::new(SessionInner {
                state: Mutex::new(SessionState {
                    progress,
                    ledger,
                    active: catalog.first_section(),
                    is_processing: false,
                    error: None,
                }),
                catalog,
                persistence,
                events,
            }),
        }
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.inner.catalog)
    }

    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.inner.persistence.last_saved()
    }

    // -----------------------------------------------------------------------
    // Progress
    // -----------------------------------------------------------------------

    /// Overwrite a task's status, persist, and announce it if it changed.
    pub fn update_task_status(&self, task: TaskRef, status: ProgressStatus) -> bool {
        let changed = self.lock().progress.update_task_status(task, status);
        self.persist();
        if changed {
            let catalog = &self.inner.catalog;
            let section = catalog.section_id(task.section()).to_string();
            let task_id = catalog.task_id(task).to_string();
            tracing::debug!(section = %section, task = %task_id, status = %status, "task status changed");
            self.inner.events.publish(WorkflowEvent::TaskStatusChanged {
                section,
                task: task_id,
                status,
            });
        }
        changed
    }

    pub fn task_status(&self, task: TaskRef) -> ProgressStatus {
        self.lock().progress.task_status(task)
    }

    pub fn section_status(&self, section: SectionRef) -> ProgressStatus {
        self.lock().progress.section_status(section)
    }

    pub fn overall_progress(&self) -> u8 {
        self.lock().progress.overall_progress()
    }

    pub fn next_incomplete_task(&self) -> Option<NextTask> {
        self.lock().progress.next_incomplete_task()
    }

    pub fn progress_snapshot(&self) -> ProgressSnapshot {
        self.lock().progress.snapshot()
    }

    /// Reset every task to pending, clear generated content, and return to
    /// the first section.
    pub fn reset_progress(&self) {
        {
            let mut state = self.lock();
            state.progress.reset();
            state.ledger.clear();
            state.active = self.inner.catalog.first_section();
        }
        tracing::info!("workflow progress reset");
        self.persist();
        self.inner.events.publish(WorkflowEvent::ProgressReset);
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    pub fn active_section(&self) -> SectionRef {
        self.lock().active
    }

    /// Gate check from the active section.
    pub fn can_navigate_to(&self, target: SectionRef) -> bool {
        let state = self.lock();
        navigation::can_navigate_to(&state.progress, state.active, target)
    }

    /// Gate check between two arbitrary sections.
    pub fn can_navigate_between(&self, current: SectionRef, target: SectionRef) -> bool {
        navigation::can_navigate_to(&self.lock().progress, current, target)
    }

    /// Move to `target` if the gate allows it.
    pub fn navigate_to(&self, target: SectionRef) -> Result<(), NavigationError> {
        let mut state = self.lock();
        navigation::check_navigation(&state.progress, state.active, target)?;
        state.active = target;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Processing / error flags
    // -----------------------------------------------------------------------

    pub fn is_processing(&self) -> bool {
        self.lock().is_processing
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn set_processing(&self, processing: bool) {
        self.lock().is_processing = processing;
    }

    /// Record an error message. Setting one also ends processing.
    pub fn set_error(&self, error: Option<String>) {
        let mut state = self.lock();
        if error.is_some() {
            state.is_processing = false;
        }
        state.error = error;
    }

    pub fn clear_error(&self) {
        self.lock().error = None;
    }

    // -----------------------------------------------------------------------
    // Content ledger
    // -----------------------------------------------------------------------

    pub fn add_content(&self, content: NewContent) -> Uuid {
        let content_type = content.content_type;
        let title = content.title.clone();
        let id = self.lock().ledger.add(content);
        self.persist();
        self.inner.events.publish(WorkflowEvent::ContentAdded {
            id,
            content_type,
            title,
        });
        id
    }

    /// Merge a patch into a record; absent ids are a no-op.
    pub fn update_content(&self, id: Uuid, patch: ContentPatch) -> bool {
        let updated = self.lock().ledger.update(id, patch);
        if updated {
            self.persist();
            self.inner.events.publish(WorkflowEvent::ContentUpdated { id });
        }
        updated
    }

    pub fn remove_content(&self, id: Uuid) -> bool {
        let removed = self.lock().ledger.remove(id);
        if removed {
            self.persist();
            self.inner.events.publish(WorkflowEvent::ContentRemoved { id });
        }
        removed
    }

    pub fn content(&self, id: Uuid) -> Option<GeneratedContent> {
        self.lock().ledger.get(id).cloned()
    }

    pub fn content_by_type(&self, content_type: ContentType) -> Vec<GeneratedContent> {
        self.lock()
            .ledger
            .list_by_type(content_type)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn all_content(&self) -> Vec<GeneratedContent> {
        self.lock().ledger.all().to_vec()
    }

    pub fn clear_content(&self) {
        let removed = {
            let mut state = self.lock();
            let removed = state.ledger.len();
            state.ledger.clear();
            removed
        };
        self.persist();
        self.inner
            .events
            .publish(WorkflowEvent::ContentCleared { removed });
    }

    // -----------------------------------------------------------------------
    // Step runs
    // -----------------------------------------------------------------------

    /// Run steps with this session as the progress sink, maintaining the
    /// processing and error flags around the run.
    pub async fn run_steps<I, T>(
        &self,
        orchestrator: &StepOrchestrator,
        enabled: I,
    ) -> Result<RunReport, OrchestratorError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.clear_error();
        self.set_processing(true);
        match orchestrator.run(enabled, self).await {
            Ok(report) => {
                self.set_processing(false);
                Ok(report)
            }
            Err(e) => {
                self.set_error(Some(e.to_string()));
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Mirror current state to storage. The lock is released before writing.
    pub fn persist(&self) -> SaveOutcome {
        let (progress, content) = {
            let state = self.lock();
            (state.progress.snapshot(), state.ledger.all().to_vec())
        };
        self.inner.persistence.save(&progress, &content)
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<S: ByteStore> ProgressSink for WorkflowSession<S> {
    fn update_task_status(&self, task: TaskRef, status: ProgressStatus) {
        WorkflowSession::update_task_status(self, task, status);
    }
}

impl<S> std::fmt::Debug for WorkflowSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowSession")
            .field("persistence", &self.inner.persistence)
            .field("events", &self.inner.events)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::catalog;
    use crate::orchestrator::{StepGraph, TriggerError, trigger_fn};
    use crate::persistence::adapter::tests::TestStore;
    use launchpad_types::config::PersistenceConfig;
    use launchpad_types::step::StepDefinition;
    use serde_json::json;

    fn test_catalog() -> Arc<Catalog> {
        Arc::new(catalog(&[
            ("infra", &["repo", "aws"]),
            ("plan", &["form"]),
            ("deploy", &["ship"]),
        ]))
    }

    fn session_with(store: Arc<TestStore>) -> WorkflowSession<Arc<TestStore>> {
        WorkflowSession::open(
            test_catalog(),
            PersistenceAdapter::new(store, PersistenceConfig::default()),
            EventBus::new(64),
        )
    }

    fn task(session: &WorkflowSession<Arc<TestStore>>, section: &str, task: &str) -> TaskRef {
        session.catalog().task(section, task).unwrap()
    }

    #[test]
    fn test_mutations_are_persisted_and_restored() {
        let store = Arc::new(TestStore::default());
        let session = session_with(store.clone());
        let repo = task(&session, "infra", "repo");
        session.update_task_status(repo, ProgressStatus::Completed);
        let id = session.add_content(NewContent::new(
            ContentType::Sitemap,
            "Sitemap",
            json!({"pages": 4}),
        ));
        assert!(store.get("launchpad-progress").is_some());
        assert!(session.last_saved().is_some());

        let reopened = session_with(store);
        assert_eq!(reopened.task_status(repo), ProgressStatus::Completed);
        assert_eq!(reopened.content(id).unwrap().title, "Sitemap");
        assert_eq!(reopened.overall_progress(), 25);
    }

    #[test]
    fn test_corrupt_snapshot_falls_back_to_defaults() {
        let store = Arc::new(TestStore::default());
        store.put("launchpad-progress", "not json");
        let session = session_with(store);
        assert_eq!(session.overall_progress(), 0);
        assert!(session.all_content().is_empty());
        let next = session.next_incomplete_task().unwrap();
        assert_eq!(next.task_id, "repo");
    }

    #[test]
    fn test_storage_failure_keeps_memory_state() {
        let store = Arc::new(TestStore {
            fail_writes: true,
            ..Default::default()
        });
        let session = session_with(store);
        let repo = task(&session, "infra", "repo");
        assert!(session.update_task_status(repo, ProgressStatus::InProgress));
        assert_eq!(session.task_status(repo), ProgressStatus::InProgress);
        assert!(session.last_saved().is_none());
    }

    #[tokio::test]
    async fn test_events_only_on_change() {
        let session = session_with(Arc::new(TestStore::default()));
        let mut rx = session.events().subscribe();
        let repo = task(&session, "infra", "repo");

        assert!(session.update_task_status(repo, ProgressStatus::Completed));
        assert!(!session.update_task_status(repo, ProgressStatus::Completed));

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event,
            WorkflowEvent::TaskStatusChanged { ref task, status: ProgressStatus::Completed, .. } if task == "repo"
        ));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_clear_content_is_announced() {
        let store = Arc::new(TestStore::default());
        let session = session_with(store.clone());
        session.add_content(NewContent::new(ContentType::Template, "landing", json!({})));
        let mut rx = session.events().subscribe();

        session.clear_content();

        assert_eq!(rx.try_recv().unwrap(), WorkflowEvent::ContentCleared { removed: 1 });
        assert!(rx.try_recv().is_err());
        assert_eq!(store.get("launchpad-generated-content").as_deref(), Some("[]"));
    }

    #[test]
    fn test_navigation_from_active_section() {
        let session = session_with(Arc::new(TestStore::default()));
        let catalog = session.catalog();
        let infra = catalog.section("infra").unwrap();
        let deploy = catalog.section("deploy").unwrap();
        let plan = catalog.section("plan").unwrap();

        assert_eq!(session.active_section(), infra);
        assert!(!session.can_navigate_to(plan));
        let err = session.navigate_to(deploy).unwrap_err();
        assert!(matches!(err, NavigationError::Blocked { ref incomplete, .. } if incomplete == "infra"));

        session.update_task_status(task(&session, "infra", "repo"), ProgressStatus::Completed);
        session.update_task_status(task(&session, "infra", "aws"), ProgressStatus::Completed);
        session.navigate_to(plan).unwrap();
        assert_eq!(session.active_section(), plan);
        assert!(!session.can_navigate_to(deploy));
        assert!(session.can_navigate_between(deploy, infra));

        session.navigate_to(infra).unwrap();
        assert_eq!(session.active_section(), infra);
    }

    #[test]
    fn test_reset_clears_everything() {
        let session = session_with(Arc::new(TestStore::default()));
        let catalog = session.catalog();
        session.update_task_status(task(&session, "infra", "repo"), ProgressStatus::Completed);
        session.update_task_status(task(&session, "infra", "aws"), ProgressStatus::Completed);
        session.navigate_to(catalog.section("plan").unwrap()).unwrap();
        session.add_content(NewContent::new(ContentType::Template, "t", json!({})));

        session.reset_progress();

        assert_eq!(session.overall_progress(), 0);
        assert!(session.all_content().is_empty());
        assert_eq!(session.active_section(), catalog.first_section());
    }

    #[test]
    fn test_error_flag_ends_processing() {
        let session = session_with(Arc::new(TestStore::default()));
        session.set_processing(true);
        assert!(session.is_processing());
        session.set_error(Some("aws credentials missing".into()));
        assert!(!session.is_processing());
        assert_eq!(session.error().as_deref(), Some("aws credentials missing"));
        session.clear_error();
        assert!(session.error().is_none());
    }

    #[test]
    fn test_content_crud_through_session() {
        let session = session_with(Arc::new(TestStore::default()));
        let a = session.add_content(NewContent::new(ContentType::PageContent, "home", json!("<p/>")));
        session.add_content(NewContent::new(ContentType::Sitemap, "map", json!([])));

        assert!(session.update_content(
            a,
            ContentPatch {
                title: Some("Home".into()),
                ..Default::default()
            }
        ));
        assert_eq!(session.content_by_type(ContentType::PageContent)[0].title, "Home");
        assert!(session.remove_content(a));
        assert!(!session.remove_content(a));
        assert_eq!(session.all_content().len(), 1);
        session.clear_content();
        assert!(session.all_content().is_empty());
    }

    #[tokio::test]
    async fn test_run_steps_projects_into_progress_and_flags() {
        let session = session_with(Arc::new(TestStore::default()));
        let catalog = session.catalog();
        let graph = StepGraph::new(
            vec![
                StepDefinition::new("repo", "Repo").bound_to("infra", "repo"),
                StepDefinition::new("aws", "AWS")
                    .depends_on(["repo"])
                    .bound_to("infra", "aws"),
            ],
            &catalog,
        )
        .unwrap();
        let mut orch = StepOrchestrator::new(Arc::new(graph));
        orch.register("repo", trigger_fn(|| async { Ok(json!("created")) }))
            .unwrap();
        orch.register(
            "aws",
            trigger_fn(|| async { Err(TriggerError::failed("bucket taken")) }),
        )
        .unwrap();

        let err = session.run_steps(&orch, ["repo", "aws"]).await.unwrap_err();

        assert!(matches!(err, OrchestratorError::StepFailed { .. }));
        assert_eq!(
            session.task_status(task(&session, "infra", "repo")),
            ProgressStatus::Completed
        );
        assert_eq!(
            session.section_status(catalog.section("infra").unwrap()),
            ProgressStatus::Error
        );
        assert!(!session.is_processing());
        assert!(session.error().unwrap().contains("bucket taken"));
    }
}

//! Navigation gate between workflow sections.
//!
//! Moving backward or staying put is always allowed. Moving forward requires
//! every section ordered before the target to be completed, not just the one
//! currently active.
//!
//! Section handles must come from the store's own catalog.

use launchpad_types::progress::ProgressStatus;
use thiserror::Error;

use crate::catalog::SectionRef;
use crate::progress::ProgressStore;

/// Errors from section navigation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("cannot navigate from '{from}' to '{to}': section '{incomplete}' is not completed")]
    Blocked {
        from: String,
        to: String,
        incomplete: String,
    },
}

/// Whether `target` may be entered from `current`. Pure.
pub fn can_navigate_to(store: &ProgressStore, current: SectionRef, target: SectionRef) -> bool {
    target.position() <= current.position() || first_incomplete_before(store, target).is_none()
}

/// The first section ordered before `target` that is not completed.
pub fn first_incomplete_before(store: &ProgressStore, target: SectionRef) -> Option<SectionRef> {
    store
        .catalog()
        .sections()
        .take_while(|s| s.position() < target.position())
        .find(|s| store.section_status(*s) != ProgressStatus::Completed)
}

/// Check the gate, describing the blocking section on refusal.
pub fn check_navigation(
    store: &ProgressStore,
    current: SectionRef,
    target: SectionRef,
) -> Result<(), NavigationError> {
    if target.position() <= current.position() {
        return Ok(());
    }
    match first_incomplete_before(store, target) {
        None => Ok(()),
        Some(blocking) => {
            let catalog = store.catalog();
            Err(NavigationError::Blocked {
                from: catalog.section_id(current).to_string(),
                to: catalog.section_id(target).to_string(),
                incomplete: catalog.section_id(blocking).to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::tests::catalog;

    fn store() -> ProgressStore {
        ProgressStore::new(Arc::new(catalog(&[
            ("a", &["a1", "a2"]),
            ("b", &["b1"]),
            ("c", &["c1"]),
        ])))
    }

    fn complete(store: &mut ProgressStore, section: &str, task: &str) {
        let t = store.catalog().task(section, task).unwrap();
        store.update_task_status(t, ProgressStatus::Completed);
    }

    fn sections(store: &ProgressStore) -> (SectionRef, SectionRef, SectionRef) {
        let c = store.catalog();
        (
            c.section("a").unwrap(),
            c.section("b").unwrap(),
            c.section("c").unwrap(),
        )
    }

    #[test]
    fn test_backward_and_same_always_allowed() {
        let store = store();
        let (a, _, c) = sections(&store);
        assert!(can_navigate_to(&store, c, a));
        assert!(can_navigate_to(&store, a, a));
        assert!(can_navigate_to(&store, c, c));
    }

    #[test]
    fn test_forward_requires_all_preceding_completed() {
        let mut store = store();
        let (a, b, c) = sections(&store);
        assert!(!can_navigate_to(&store, a, b));
        assert!(!can_navigate_to(&store, a, c));

        complete(&mut store, "a", "a1");
        complete(&mut store, "a", "a2");
        assert!(can_navigate_to(&store, a, b));
        assert!(!can_navigate_to(&store, a, c));

        complete(&mut store, "b", "b1");
        assert!(can_navigate_to(&store, a, c));
    }

    #[test]
    fn test_gate_checks_every_preceding_section() {
        let mut store = store();
        let (a, b, c) = sections(&store);
        // b done but a not: jumping from b to c is still refused.
        complete(&mut store, "b", "b1");
        assert!(!can_navigate_to(&store, b, c));

        let err = check_navigation(&store, b, c).unwrap_err();
        assert_eq!(
            err,
            NavigationError::Blocked {
                from: "b".into(),
                to: "c".into(),
                incomplete: "a".into()
            }
        );
        assert!(check_navigation(&store, c, a).is_ok());
    }

    #[test]
    fn test_error_section_blocks_forward() {
        let mut store = store();
        let (a, b, _) = sections(&store);
        let a1 = store.catalog().task("a", "a1").unwrap();
        complete(&mut store, "a", "a2");
        store.update_task_status(a1, ProgressStatus::Error);
        assert!(!can_navigate_to(&store, a, b));
    }
}

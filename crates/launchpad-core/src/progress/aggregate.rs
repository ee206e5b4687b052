//! Pure status-aggregation rules.

use launchpad_types::progress::ProgressStatus;

/// Derive a section status from its task statuses.
///
/// Precedence, first match wins:
/// 1. all tasks completed -> completed
/// 2. any task error -> error
/// 3. any task in progress -> in progress
/// 4. any task completed -> in progress (partial completion)
/// 5. otherwise -> pending
///
/// An empty slice is pending; a validated catalog never produces one.
pub fn aggregate_status(tasks: &[ProgressStatus]) -> ProgressStatus {
    if tasks.is_empty() {
        return ProgressStatus::Pending;
    }
    if tasks.iter().all(|s| *s == ProgressStatus::Completed) {
        return ProgressStatus::Completed;
    }
    if tasks.contains(&ProgressStatus::Error) {
        return ProgressStatus::Error;
    }
    if tasks
        .iter()
        .any(|s| matches!(s, ProgressStatus::InProgress | ProgressStatus::Completed))
    {
        return ProgressStatus::InProgress;
    }
    ProgressStatus::Pending
}

/// `round(100 * completed / total)` as an integer percent, 0 for an empty set.
///
/// Halves round up, matching conventional rounding for non-negative values.
pub fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    ((200 * completed + total) / (2 * total)) as u8
}

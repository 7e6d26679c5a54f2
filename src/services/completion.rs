//! Completion and deletion of tasks.
//!
//! Both operations are idempotent and never fail on an unknown id.

use crate::domain::models::{CompletionOutcome, DailyState, DeletionOutcome, RecurringGoal};

/// Mark `task_id` done for today.
///
/// Only ids of active tasks or configured recurring goals can be completed.
pub fn complete(state: &mut DailyState, goals: &[RecurringGoal], task_id: &str) -> CompletionOutcome {
    if state.is_completed(task_id) {
        return CompletionOutcome::AlreadyCompleted;
    }

    let known = state.find_active(task_id).is_some() || goals.iter().any(|g| g.id == task_id);
    if !known {
        tracing::debug!(task_id, "completion ignored for unknown id");
        return CompletionOutcome::UnknownTask;
    }

    state.completed_ids.push(task_id.to_string());
    CompletionOutcome::Completed
}

/// Remove `task_id` from the active list.
///
/// Backlog entries and recurring goals cannot be deleted.
pub fn delete(state: &mut DailyState, task_id: &str) -> DeletionOutcome {
    let before = state.active.len();
    state.active.retain(|task| task.id != task_id);
    if state.active.len() < before {
        DeletionOutcome::Deleted
    } else {
        DeletionOutcome::NotFound
    }
}

//! Daily rollover (the midnight election).
//!
//! When the stored state belongs to an earlier day, everything still pending
//! is pooled, re-prioritized and split again into `active` and `backlog`.
//! Urgent tasks always win a seat; among equals the oldest goes first, so
//! no task starves while capacity is at least one.

use chrono::NaiveDate;

use crate::domain::models::{AdHocTask, DailyState};

/// Whether `state` must be re-elected before it can be used on `today`.
pub fn needs_rollover(state: &DailyState, today: NaiveDate) -> bool {
    state.logical_date != today
}

/// Derive `today`'s state from `previous`.
pub fn elect(previous: &DailyState, today: NaiveDate, capacity: usize) -> DailyState {
    let mut pool: Vec<AdHocTask> = previous
        .active
        .iter()
        .chain(previous.backlog.iter())
        .filter(|task| !previous.is_completed(&task.id))
        .cloned()
        .map(|mut task| {
            // Deferral to a later hour only applies to the day it was set.
            task.earliest_eligible_hour = 0;
            task
        })
        .collect();

    // `sort_by` is stable: full ties keep their pooled order.
    pool.sort_by(|a, b| {
        b.is_urgent
            .cmp(&a.is_urgent)
            .then(a.created_at.cmp(&b.created_at))
    });

    let backlog = if pool.len() > capacity {
        pool.split_off(capacity)
    } else {
        Vec::new()
    };

    tracing::info!(
        from = %previous.logical_date,
        to = %today,
        active = pool.len(),
        backlog = backlog.len(),
        dropped_completed = previous.completed_ids.len(),
        "daily election complete"
    );

    DailyState {
        logical_date: today,
        active: pool,
        backlog,
        completed_ids: Vec::new(),
        last_nudge_at: previous.last_nudge_at,
    }
}

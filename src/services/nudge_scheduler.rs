//! Nudge scheduler.
//!
//! Each tick first applies the global cool-down, then collects every
//! eligible candidate and picks one uniformly at random. Urgency plays no
//! part in the pick; it only matters for admission and the election.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::domain::models::{DailyState, RecurringGoal, Task};
use crate::domain::ports::ClockReading;

/// What the scheduler decided for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NudgeDecision {
    /// The last nudge was too recent.
    CoolingDown { remaining_secs: i64 },
    /// Nothing is eligible right now.
    NoCandidates,
    /// Surface this task.
    Nudge(Task),
}

/// Every task that may be nudged at `now`, ignoring the cool-down.
///
/// Recurring goals come first in config order, then active tasks in list
/// order.
pub fn eligible_candidates(
    state: &DailyState,
    goals: &[RecurringGoal],
    now: &ClockReading,
) -> Vec<Task> {
    let goal_candidates = goals
        .iter()
        .filter(|goal| !state.is_completed(&goal.id))
        .filter(|goal| goal.applies_on(now.weekday) && goal.in_window(now.hour))
        .cloned()
        .map(Task::RecurringGoal);

    let task_candidates = state
        .active
        .iter()
        .filter(|task| !state.is_completed(&task.id))
        .filter(|task| task.is_eligible_at(now.hour))
        .cloned()
        .map(Task::AdHoc);

    goal_candidates.chain(task_candidates).collect()
}

pub struct NudgeScheduler {
    cooldown_secs: i64,
    rng: Mutex<StdRng>,
}

impl NudgeScheduler {
    pub fn new(cooldown_secs: i64) -> Self {
        Self::with_rng(cooldown_secs, StdRng::from_entropy())
    }

    /// Scheduler with a caller-supplied RNG (deterministic in tests).
    pub fn with_rng(cooldown_secs: i64, rng: StdRng) -> Self {
        Self {
            cooldown_secs,
            rng: Mutex::new(rng),
        }
    }

    pub fn cooldown_secs(&self) -> i64 {
        self.cooldown_secs
    }

    /// Seconds left before another nudge may go out, if any.
    pub fn cooldown_remaining(&self, state: &DailyState, now: &ClockReading) -> Option<i64> {
        let elapsed = now.epoch_secs - state.last_nudge_at;
        (elapsed < self.cooldown_secs).then(|| self.cooldown_secs - elapsed)
    }

    /// Decide what this tick should do. Does not mutate `state`.
    pub fn decide(
        &self,
        state: &DailyState,
        goals: &[RecurringGoal],
        now: &ClockReading,
    ) -> NudgeDecision {
        if let Some(remaining_secs) = self.cooldown_remaining(state, now) {
            return NudgeDecision::CoolingDown { remaining_secs };
        }

        let candidates = eligible_candidates(state, goals, now);
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        match candidates.choose(&mut *rng) {
            Some(task) => {
                tracing::debug!(
                    candidates = candidates.len(),
                    chosen = task.id(),
                    "nudge candidate chosen"
                );
                NudgeDecision::Nudge(task.clone())
            }
            None => NudgeDecision::NoCandidates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::AdHocTask;
    use chrono::NaiveDate;

    const MONDAY_EPOCH: i64 = 1_709_510_400;

    fn monday_at(hour: u8) -> ClockReading {
        ClockReading {
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            weekday: 0,
            hour,
            epoch_secs: MONDAY_EPOCH + i64::from(hour) * 3600,
        }
    }

    fn weekday_goal() -> RecurringGoal {
        RecurringGoal::new("work_prod", "Prod", vec![0, 1, 2, 3, 4], (9, 12), "alain_meaning")
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(Task::id).collect()
    }

    #[test]
    fn test_goal_window_gates_candidacy() {
        let state = DailyState::new(monday_at(0).date);
        let goals = vec![weekday_goal()];

        assert!(eligible_candidates(&state, &goals, &monday_at(8)).is_empty());
        assert_eq!(ids(&eligible_candidates(&state, &goals, &monday_at(10))), vec!["work_prod"]);
        assert!(eligible_candidates(&state, &goals, &monday_at(12)).is_empty());
    }

    #[test]
    fn test_goal_outside_weekdays_is_not_candidate() {
        let state = DailyState::new(monday_at(0).date);
        let mut saturday = monday_at(10);
        saturday.weekday = 5;
        assert!(eligible_candidates(&state, &[weekday_goal()], &saturday).is_empty());
    }

    #[test]
    fn test_completed_items_are_excluded() {
        let mut state = DailyState::new(monday_at(0).date);
        state.active.push(AdHocTask::new("t-1", "one", 0));
        state.completed_ids = vec!["work_prod".to_string(), "t-1".to_string()];

        assert!(eligible_candidates(&state, &[weekday_goal()], &monday_at(10)).is_empty());
    }

    #[test]
    fn test_earliest_eligible_hour_gates_active_tasks() {
        let mut state = DailyState::new(monday_at(0).date);
        state.active.push(AdHocTask::new("evening", "later", 0).not_before(18));

        assert!(eligible_candidates(&state, &[], &monday_at(17)).is_empty());
        assert_eq!(ids(&eligible_candidates(&state, &[], &monday_at(18))), vec!["evening"]);
    }

    #[test]
    fn test_backlog_is_never_a_candidate() {
        let mut state = DailyState::new(monday_at(0).date);
        state.backlog.push(AdHocTask::new("t-back", "later", 0));
        assert!(eligible_candidates(&state, &[], &monday_at(10)).is_empty());
    }

    #[test]
    fn test_cooldown_blocks_before_candidates() {
        let scheduler = NudgeScheduler::with_rng(3600, StdRng::seed_from_u64(1));
        let mut state = DailyState::new(monday_at(0).date);
        state.active.push(AdHocTask::new("t-1", "one", 0));
        let now = monday_at(10);
        state.last_nudge_at = now.epoch_secs - 600;

        assert_eq!(
            scheduler.decide(&state, &[], &now),
            NudgeDecision::CoolingDown { remaining_secs: 3000 }
        );

        state.last_nudge_at = now.epoch_secs - 3600;
        assert!(matches!(scheduler.decide(&state, &[], &now), NudgeDecision::Nudge(_)));
    }

    #[test]
    fn test_no_candidates() {
        let scheduler = NudgeScheduler::with_rng(3600, StdRng::seed_from_u64(1));
        let state = DailyState::new(monday_at(0).date);
        assert_eq!(scheduler.decide(&state, &[], &monday_at(10)), NudgeDecision::NoCandidates);
    }

    #[test]
    fn test_pick_spreads_across_candidates() {
        let scheduler = NudgeScheduler::with_rng(3600, StdRng::seed_from_u64(99));
        let mut state = DailyState::new(monday_at(0).date);
        state.active.push(AdHocTask::new("a", "a", 0));
        state.active.push(AdHocTask::new("b", "b", 0).urgent(true));
        let now = monday_at(10);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            if let NudgeDecision::Nudge(task) = scheduler.decide(&state, &[weekday_goal()], &now) {
                seen.insert(task.id().to_string());
            }
        }
        assert_eq!(seen.len(), 3);
    }
}

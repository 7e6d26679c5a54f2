//! End-to-end engine scenarios through `NudgeService`.

mod common;

use std::sync::Arc;

use common::{harness, harness_with, monday, sunday, weekday_goal, COOLDOWN_SECS};
use nudge::adapters::clock::FixedClock;
use nudge::adapters::memory::InMemoryDailyStateRepository;
use nudge::domain::models::{AdHocTask, CompletionOutcome, DailyState, Placement, TickOutcome};
use nudge::domain::ports::{Clock, DailyStateRepository};
use nudge::services::nudge_scheduler::eligible_candidates;
use nudge::services::SubmitRequest;

fn nudged_id(outcome: &TickOutcome) -> Option<&str> {
    match outcome {
        TickOutcome::Nudged { nudge } => Some(nudge.task_id.as_str()),
        _ => None,
    }
}

#[tokio::test]
async fn scenario_a_non_urgent_overflow_goes_to_backlog() {
    let h = harness(15, vec![], 10);

    for i in 0..15 {
        let admission = h.service.add(SubmitRequest::new(format!("task {i}"))).await.unwrap();
        assert_eq!(admission.placement, Placement::Active);
    }
    let sixteenth = h.service.add(SubmitRequest::new("one too many")).await.unwrap();
    assert_eq!(sixteenth.placement, Placement::Backlog);

    let agenda = h.service.agenda().await;
    assert_eq!(agenda.active.len(), 15);
    assert_eq!(agenda.backlog.len(), 1);
    assert_eq!(agenda.backlog[0].text, "one too many");
}

#[tokio::test]
async fn scenario_b_urgent_exceeds_capacity() {
    let h = harness(15, vec![], 10);
    for i in 0..16 {
        h.service.add(SubmitRequest::new(format!("task {i}"))).await.unwrap();
    }

    let urgent = h.service.add(SubmitRequest::new("server down").urgent()).await.unwrap();
    assert_eq!(urgent.placement, Placement::Active);

    let agenda = h.service.agenda().await;
    assert_eq!(agenda.active.len(), 16);
    assert!(agenda.active.iter().any(|item| item.id == urgent.task.id));
    assert_eq!(agenda.backlog.len(), 1);
}

#[tokio::test]
async fn scenario_c_goal_window_and_completion() {
    let h = harness(15, vec![weekday_goal()], 8);

    assert_eq!(h.service.tick().await.unwrap(), TickOutcome::NoCandidates);

    h.clock.set_hour(10);
    let outcome = h.service.tick().await.unwrap();
    assert_eq!(nudged_id(&outcome), Some("work_prod"));

    assert_eq!(h.service.complete("work_prod").await.unwrap(), CompletionOutcome::Completed);
    h.clock.set_hour(11);
    assert_eq!(h.service.tick().await.unwrap(), TickOutcome::NoCandidates);

    // Tuesday: the rollover clears completions.
    h.clock.advance_days(1);
    let outcome = h.service.tick().await.unwrap();
    assert_eq!(nudged_id(&outcome), Some("work_prod"));
    assert_eq!(h.channel.sent().len(), 2);
}

#[tokio::test]
async fn scenario_d_election_orders_urgent_then_oldest() {
    let yesterday_0700 = sunday().and_hms_opt(7, 0, 0).unwrap().and_utc().timestamp();
    let hour = 3600;

    let mut previous = DailyState::new(sunday());
    previous.active = vec![
        AdHocTask::new("taskA", "A", yesterday_0700 + hour),
        AdHocTask::new("taskB", "B", yesterday_0700 + 2 * hour).urgent(true),
    ];
    previous.backlog = vec![AdHocTask::new("taskC", "C", yesterday_0700)];

    let repo = Arc::new(InMemoryDailyStateRepository::with_state(previous));
    let h = harness_with(repo.clone(), Arc::new(FixedClock::at(monday(), 0)), 2, vec![]);

    let agenda = h.service.agenda().await;
    let active: Vec<_> = agenda.active.iter().map(|item| item.id.as_str()).collect();
    let backlog: Vec<_> = agenda.backlog.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(active, vec!["taskB", "taskC"]);
    assert_eq!(backlog, vec!["taskA"]);

    let stored = repo.load().await.unwrap().unwrap();
    assert_eq!(stored.logical_date, monday());
}

#[tokio::test]
async fn scenario_e_deferred_task_ignores_cooldown_for_eligibility() {
    let h = harness(15, vec![], 17);
    let admission = h.service.add(SubmitRequest::new("call home").not_before(18)).await.unwrap();

    assert_eq!(h.service.tick().await.unwrap(), TickOutcome::NoCandidates);

    h.clock.set_hour(18);
    let mut state = DailyState::new(monday());
    state.active.push(admission.task.clone());
    let now = h.clock.now();
    state.last_nudge_at = now.epoch_secs;
    let candidates = eligible_candidates(&state, &[], &now);
    assert_eq!(candidates.len(), 1);

    let outcome = h.service.tick().await.unwrap();
    assert_eq!(nudged_id(&outcome), Some(admission.task.id.as_str()));
}

#[tokio::test]
async fn cooldown_prevents_back_to_back_nudges() {
    let h = harness(15, vec![], 10);
    h.service.add(SubmitRequest::new("stretch")).await.unwrap();

    assert!(nudged_id(&h.service.tick().await.unwrap()).is_some());

    h.clock.advance_secs(COOLDOWN_SECS - 1);
    assert_eq!(
        h.service.tick().await.unwrap(),
        TickOutcome::CoolingDown { remaining_secs: 1 }
    );

    h.clock.advance_secs(1);
    assert!(nudged_id(&h.service.tick().await.unwrap()).is_some());
    assert_eq!(h.channel.sent().len(), 2);
}

#[tokio::test]
async fn complete_twice_changes_nothing() {
    let h = harness(15, vec![], 10);
    let task = h.service.add(SubmitRequest::new("laundry")).await.unwrap().task;

    assert_eq!(h.service.complete(&task.id).await.unwrap(), CompletionOutcome::Completed);
    let before = h.service.status().await;
    assert_eq!(
        h.service.complete(&task.id).await.unwrap(),
        CompletionOutcome::AlreadyCompleted
    );
    let after = h.service.status().await;
    assert_eq!(before.completed, after.completed);
}

#[tokio::test]
async fn failed_delivery_still_starts_cooldown() {
    let h = harness(15, vec![], 10);
    h.service.add(SubmitRequest::new("water plants")).await.unwrap();

    h.channel.fail_next(true);
    assert!(h.service.tick().await.is_err());

    h.clock.advance_secs(60);
    assert!(matches!(
        h.service.tick().await.unwrap(),
        TickOutcome::CoolingDown { .. }
    ));
}

#[tokio::test]
async fn test_nudge_leaves_state_untouched() {
    let h = harness(15, vec![], 10);
    let before = h.service.status().await;

    let nudge = h.service.test_nudge().await.unwrap();
    assert_eq!(nudge.task_id, "test_task");

    let after = h.service.status().await;
    assert_eq!(before.last_nudge_at, after.last_nudge_at);
    assert_eq!(h.channel.sent().len(), 1);
}

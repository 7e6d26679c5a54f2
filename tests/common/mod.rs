//! Common test utilities for integration tests
//!
//! Provides shared fixtures for building a fully wired `NudgeService`
//! against a controllable clock and a recording channel.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use nudge::adapters::clock::FixedClock;
use nudge::adapters::console::RecordingChannel;
use nudge::adapters::memory::InMemoryDailyStateRepository;
use nudge::domain::models::{QuotesConfig, RecurringGoal};
use nudge::domain::ports::DailyStateRepository;
use nudge::services::{NudgeScheduler, NudgeService, QuoteBook, TaskStore};

pub const COOLDOWN_SECS: i64 = 3600;

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// 2024-03-04, a Monday.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

/// 2024-03-03, the Sunday before [`monday`].
pub fn sunday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()
}

/// The weekday goal used by the window scenarios: Monday to Friday, [9, 12).
pub fn weekday_goal() -> RecurringGoal {
    RecurringGoal::new("work_prod", "1 hr Product Knowledge", vec![0, 1, 2, 3, 4], (9, 12), "alain_meaning")
}

/// A wired service plus the handles tests steer it with.
pub struct Harness {
    pub service: Arc<NudgeService>,
    pub clock: Arc<FixedClock>,
    pub channel: Arc<RecordingChannel>,
}

pub fn harness_with(
    repo: Arc<dyn DailyStateRepository>,
    clock: Arc<FixedClock>,
    capacity: usize,
    goals: Vec<RecurringGoal>,
) -> Harness {
    let channel = Arc::new(RecordingChannel::new());
    let store = TaskStore::new(repo, clock.clone(), capacity);
    let service = NudgeService::new(
        store,
        NudgeScheduler::with_rng(COOLDOWN_SECS, StdRng::seed_from_u64(7)),
        QuoteBook::with_rng(&QuotesConfig::default(), StdRng::seed_from_u64(7)),
        goals,
        channel.clone(),
    );
    Harness {
        service: Arc::new(service),
        clock,
        channel,
    }
}

/// In-memory harness starting on Monday at `hour`.
pub fn harness(capacity: usize, goals: Vec<RecurringGoal>, hour: u8) -> Harness {
    harness_with(
        Arc::new(InMemoryDailyStateRepository::new()),
        Arc::new(FixedClock::at(monday(), hour)),
        capacity,
        goals,
    )
}

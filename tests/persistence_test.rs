//! Durable backends: state written by one service survives into the next.

mod common;

use std::sync::Arc;

use common::{harness_with, monday, temp_dir};
use nudge::adapters::clock::FixedClock;
use nudge::adapters::file::JsonFileDailyStateRepository;
use nudge::adapters::sqlite::{database_url, initialize_database, SqliteDailyStateRepository};
use nudge::domain::models::{CompletionOutcome, Config, StorageBackend};
use nudge::domain::ports::DailyStateRepository;
use nudge::infrastructure::setup::open_repository;
use nudge::services::SubmitRequest;

#[tokio::test]
async fn sqlite_state_survives_restart() {
    let dir = temp_dir();
    let url = database_url(&dir.path().join("nudge.db").display().to_string());

    let task_id = {
        let pool = initialize_database(&url, None).await.unwrap();
        let repo = Arc::new(SqliteDailyStateRepository::new(pool, "default", 15));
        let h = harness_with(repo, Arc::new(FixedClock::at(monday(), 10)), 15, vec![]);
        let task = h.service.add(SubmitRequest::new("renew passport")).await.unwrap().task;
        h.service.complete(&task.id).await.unwrap();
        task.id
    };

    let pool = initialize_database(&url, None).await.unwrap();
    let repo = Arc::new(SqliteDailyStateRepository::new(pool, "default", 15));
    let h = harness_with(repo, Arc::new(FixedClock::at(monday(), 11)), 15, vec![]);

    let agenda = h.service.agenda().await;
    assert_eq!(agenda.active.len(), 1);
    assert!(agenda.active[0].done);
    assert_eq!(
        h.service.complete(&task_id).await.unwrap(),
        CompletionOutcome::AlreadyCompleted
    );
}

#[tokio::test]
async fn sqlite_subscribers_do_not_share_state() {
    let dir = temp_dir();
    let url = database_url(&dir.path().join("nudge.db").display().to_string());
    let pool = initialize_database(&url, None).await.unwrap();

    let alice = Arc::new(SqliteDailyStateRepository::new(pool.clone(), "alice", 15));
    let h = harness_with(alice, Arc::new(FixedClock::at(monday(), 10)), 15, vec![]);
    h.service.add(SubmitRequest::new("alice's task")).await.unwrap();

    let bob = SqliteDailyStateRepository::new(pool, "bob", 15);
    assert!(bob.load().await.unwrap().is_none());
}

#[tokio::test]
async fn file_state_survives_restart_and_rolls_over() {
    let dir = temp_dir();
    let path = dir.path().join("user_state.json");
    let clock = Arc::new(FixedClock::at(monday(), 10));

    {
        let repo = Arc::new(JsonFileDailyStateRepository::new(&path, 1));
        let h = harness_with(repo, clock.clone(), 1, vec![]);
        h.service.add(SubmitRequest::new("first")).await.unwrap();
        h.service.add(SubmitRequest::new("second")).await.unwrap();
    }

    clock.advance_days(1);
    let repo = Arc::new(JsonFileDailyStateRepository::new(&path, 1));
    let h = harness_with(repo.clone(), clock, 1, vec![]);

    let agenda = h.service.agenda().await;
    assert_eq!(agenda.active.len(), 1);
    assert_eq!(agenda.active[0].text, "first");
    assert_eq!(agenda.backlog.len(), 1);
    assert_eq!(repo.load().await.unwrap().unwrap().logical_date, monday().succ_opt().unwrap());
}

#[tokio::test]
async fn legacy_file_is_upgraded_on_load() {
    let dir = temp_dir();
    let path = dir.path().join("user_state.json");
    std::fs::write(
        &path,
        r#"{"date":"2024-03-04","completed":["work_dsa"],"dynamic_tasks":[
            {"id":"a","text":"A","persona":"general_encourage"},
            {"id":"b","text":"B","persona":"general_encourage"},
            {"id":"c","text":"C","persona":"general_encourage"}
        ]}"#,
    )
    .unwrap();

    let repo = Arc::new(JsonFileDailyStateRepository::new(&path, 2));
    let h = harness_with(repo, Arc::new(FixedClock::at(monday(), 10)), 2, vec![]);

    let agenda = h.service.agenda().await;
    assert_eq!(agenda.active.len(), 2);
    assert_eq!(agenda.backlog.len(), 1);
    assert_eq!(agenda.completed_count, 1);
}

#[tokio::test]
async fn memory_backend_is_selected_by_config() {
    let mut config = Config::default();
    config.storage.backend = StorageBackend::Memory;
    assert_eq!(open_repository(&config).await.backend(), "memory");

    let dir = temp_dir();
    config.storage.backend = StorageBackend::File;
    config.storage.state_file = dir.path().join("state.json").display().to_string();
    assert_eq!(open_repository(&config).await.backend(), "file");
}

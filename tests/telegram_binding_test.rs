//! The bot does not start its cool-down before anyone has said `/start`.

mod common;

use std::sync::Arc;

use common::{monday, weekday_goal, COOLDOWN_SECS};
use mockito::{Matcher, Server};
use rand::rngs::StdRng;
use rand::SeedableRng;

use nudge::adapters::clock::FixedClock;
use nudge::adapters::memory::InMemoryDailyStateRepository;
use nudge::adapters::telegram::client::Update;
use nudge::adapters::telegram::{ChatBinding, TelegramChannel, TelegramClient, TelegramClientConfig, TelegramPoller};
use nudge::domain::models::{QuotesConfig, TickOutcome};
use nudge::services::{NudgeScheduler, NudgeService, QuoteBook, TaskStore};

fn start_update(chat_id: i64) -> Update {
    serde_json::from_value(serde_json::json!({
        "update_id": 1,
        "message": {"message_id": 10, "chat": {"id": chat_id}, "from": {"id": 1, "first_name": "Sam"}, "text": "/start"}
    }))
    .unwrap()
}

#[tokio::test]
async fn start_then_tick_nudges_right_away() {
    let mut server = Server::new_async().await;
    let greeting = server
        .mock("POST", "/botT/sendMessage")
        .match_body(Matcher::Regex("Hello Sam".to_string()))
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok":true,"result":{"message_id":11,"chat":{"id":42}}}"#)
        .create_async()
        .await;
    let nudge = server
        .mock("POST", "/botT/sendMessage")
        .match_body(Matcher::Regex("done_work_prod".to_string()))
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok":true,"result":{"message_id":12,"chat":{"id":42}}}"#)
        .expect(1)
        .create_async()
        .await;

    let client = Arc::new(
        TelegramClient::with_config(TelegramClientConfig {
            token: "T".to_string(),
            api_base: server.url(),
            poll_timeout_secs: 0,
        })
        .unwrap(),
    );
    let chat = ChatBinding::new(None);
    let clock = Arc::new(FixedClock::at(monday(), 10));
    let service = Arc::new(NudgeService::new(
        TaskStore::new(Arc::new(InMemoryDailyStateRepository::new()), clock.clone(), 15),
        NudgeScheduler::with_rng(COOLDOWN_SECS, StdRng::seed_from_u64(7)),
        QuoteBook::with_rng(&QuotesConfig::default(), StdRng::seed_from_u64(7)),
        vec![weekday_goal()],
        Arc::new(TelegramChannel::new(client.clone(), chat.clone())),
    ));

    assert_eq!(service.tick().await.unwrap(), TickOutcome::NoRecipient);
    assert_eq!(service.status().await.last_nudge_at, 0);

    let poller = TelegramPoller::new(client, service.clone(), chat.clone());
    poller.handle_update(start_update(42)).await;
    assert_eq!(chat.get(), Some(42));

    clock.advance_secs(60);
    match service.tick().await.unwrap() {
        TickOutcome::Nudged { nudge } => assert_eq!(nudge.task_id, "work_prod"),
        other => panic!("expected a nudge, got {other:?}"),
    }

    greeting.assert_async().await;
    nudge.assert_async().await;
}

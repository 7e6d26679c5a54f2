//! Local notification channels.
//!
//! `LogChannel` prints nudges to stdout and the log; it is used when no
//! chat transport is configured. `RecordingChannel` keeps them in memory.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Nudge;
use crate::domain::ports::NotificationChannel;

/// Render a nudge as plain text.
pub fn render_plain(nudge: &Nudge) -> String {
    format!(
        "💡 A thought for you:\n{}\n\n👉 Task: {} [{}]",
        nudge.quote, nudge.task_text, nudge.task_id
    )
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogChannel;

#[async_trait]
impl NotificationChannel for LogChannel {
    async fn emit_nudge(&self, nudge: &Nudge) -> DomainResult<()> {
        tracing::info!(task_id = %nudge.task_id, persona = %nudge.persona, "nudge");
        println!("{}\n", render_plain(nudge));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

#[derive(Debug, Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<Nudge>>,
    fail: AtomicBool,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent deliveries fail until switched back.
    pub fn fail_next(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Nudge> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn emit_nudge(&self, nudge: &Nudge) -> DomainResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::NotificationFailed("recording channel set to fail".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(nudge.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nudge() -> Nudge {
        Nudge {
            task_id: "work_dsa".to_string(),
            task_text: "Solve 1 LeetCode".to_string(),
            quote: "“Begin.”".to_string(),
            persona: "maker_creativity".to_string(),
        }
    }

    #[test]
    fn test_render_plain_contains_quote_and_task() {
        let text = render_plain(&nudge());
        assert!(text.contains("“Begin.”"));
        assert!(text.contains("Solve 1 LeetCode"));
        assert!(text.contains("[work_dsa]"));
    }

    #[tokio::test]
    async fn test_log_channel_accepts_nudges() {
        assert!(LogChannel.emit_nudge(&nudge()).await.is_ok());
    }

    #[tokio::test]
    async fn test_recording_channel_can_fail() {
        let channel = RecordingChannel::new();
        channel.emit_nudge(&nudge()).await.unwrap();
        channel.fail_next(true);
        assert!(channel.emit_nudge(&nudge()).await.is_err());
        assert_eq!(channel.sent().len(), 1);
    }
}

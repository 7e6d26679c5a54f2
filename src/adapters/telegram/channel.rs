//! Telegram notification channel.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use super::client::{InlineKeyboardButton, InlineKeyboardMarkup, TelegramClient};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Nudge;
use crate::domain::ports::NotificationChannel;

pub const DONE_PREFIX: &str = "done_";
pub const DELETE_PREFIX: &str = "del_";

/// The chat nudges are delivered to.
///
/// Either configured up front or bound by the first `/start`.
#[derive(Debug, Clone, Default)]
pub struct ChatBinding(Arc<RwLock<Option<i64>>>);

impl ChatBinding {
    pub fn new(chat_id: Option<i64>) -> Self {
        Self(Arc::new(RwLock::new(chat_id)))
    }

    pub fn get(&self) -> Option<i64> {
        *self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bind `chat_id` if nothing is bound yet. Returns whether `chat_id` is
    /// now the bound chat.
    pub fn bind_if_unset(&self, chat_id: i64) -> bool {
        let mut bound = self.0.write().unwrap_or_else(PoisonError::into_inner);
        match *bound {
            Some(existing) => existing == chat_id,
            None => {
                *bound = Some(chat_id);
                true
            }
        }
    }

    pub fn accepts(&self, chat_id: i64) -> bool {
        self.get() == Some(chat_id)
    }
}

/// Minimal escaping for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

pub fn render_nudge_html(nudge: &Nudge) -> String {
    format!(
        "💡 <b>A thought for you:</b>\n<i>{}</i>\n\n👉 <b>Task:</b> {}",
        escape_html(&nudge.quote),
        escape_html(&nudge.task_text)
    )
}

pub fn done_button(task_id: &str) -> InlineKeyboardButton {
    InlineKeyboardButton::callback("✅ I Did It", format!("{DONE_PREFIX}{task_id}"))
}

pub struct TelegramChannel {
    client: Arc<TelegramClient>,
    chat: ChatBinding,
}

impl TelegramChannel {
    pub fn new(client: Arc<TelegramClient>, chat: ChatBinding) -> Self {
        Self { client, chat }
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    async fn emit_nudge(&self, nudge: &Nudge) -> DomainResult<()> {
        let chat_id = self.chat.get().ok_or_else(|| {
            DomainError::NotificationFailed("no chat bound yet; send /start to the bot".to_string())
        })?;

        let markup = InlineKeyboardMarkup::single_column([done_button(&nudge.task_id)]);
        self.client
            .send_message(chat_id, &render_nudge_html(nudge), Some("HTML"), Some(markup))
            .await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "telegram"
    }

    fn is_ready(&self) -> bool {
        self.chat.get().is_some()
    }
}

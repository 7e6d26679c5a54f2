//! Long-polling update loop for the Telegram bot.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use super::channel::{ChatBinding, DELETE_PREFIX, DONE_PREFIX};
use super::client::{
    CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, Message, TelegramClient, TelegramError, Update,
};
use super::commands::{parse_callback, parse_command, BotCommand, CallbackAction, ADD_USAGE};
use crate::domain::errors::DomainError;
use crate::domain::models::{CompletionOutcome, DeletionOutcome, MenuEntry, Placement};
use crate::services::nudge_service::NudgeService;

const RETRY_DELAY: Duration = Duration::from_secs(5);

const HELP_TEXT: &str = "Commands:\n\
/add [--urgent] [--after HH | --evening] text - add a one-off task\n\
/list - today's agenda\n\
/done - mark something done\n\
/delete - remove a task\n\
/test - send a test nudge";

pub struct TelegramPoller {
    client: Arc<TelegramClient>,
    service: Arc<NudgeService>,
    chat: ChatBinding,
    offset: Option<i64>,
}

impl TelegramPoller {
    pub fn new(client: Arc<TelegramClient>, service: Arc<NudgeService>, chat: ChatBinding) -> Self {
        Self {
            client,
            service,
            chat,
            offset: None,
        }
    }

    /// Poll until `shutdown` flips to true.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(bound_chat = ?self.chat.get(), "telegram poller started");

        loop {
            tokio::select! {
                result = self.client.get_updates(self.offset) => match result {
                    Ok(updates) => {
                        for update in updates {
                            self.offset = Some(update.update_id + 1);
                            self.handle_update(update).await;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to fetch telegram updates");
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                },
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("telegram poller stopped");
    }

    /// Handle one update. Failures are logged, never propagated.
    pub async fn handle_update(&self, update: Update) {
        let result = if let Some(query) = update.callback_query {
            self.handle_callback(query).await
        } else if let Some(message) = update.message {
            self.handle_message(message).await
        } else {
            Ok(())
        };

        if let Err(e) = result {
            tracing::warn!(update_id = update.update_id, error = %e, "failed to handle telegram update");
        }
    }

    async fn handle_message(&self, message: Message) -> Result<(), TelegramError> {
        let chat_id = message.chat.id;
        let Some(command) = message.text.as_deref().and_then(parse_command) else {
            return Ok(());
        };

        if command == BotCommand::Start {
            return self.handle_start(&message).await;
        }
        if !self.chat.accepts(chat_id) {
            tracing::debug!(chat_id, "ignoring command from unbound chat");
            return Ok(());
        }

        tracing::debug!(chat_id, ?command, "telegram command");
        match command {
            BotCommand::Start => Ok(()),
            BotCommand::Add(args) => {
                let reply = match self.service.add(args.into()).await {
                    Ok(admission) => match admission.placement {
                        Placement::Active => format!("✍️ Added: '{}'. I'll keep it in mind.", admission.task.text),
                        Placement::Backlog => format!(
                            "✍️ Added to the backlog: '{}'. Today's list is full; it will be considered tomorrow.",
                            admission.task.text
                        ),
                    },
                    Err(DomainError::InvalidInput(_)) => ADD_USAGE.to_string(),
                    Err(e) => format!("Could not save the task: {e}"),
                };
                self.reply(chat_id, &reply).await
            }
            BotCommand::List => {
                let agenda = self.service.agenda().await;
                self.reply(chat_id, &agenda.to_text()).await
            }
            BotCommand::Done(Some(id)) => {
                let reply = completion_reply(self.service.complete(&id).await);
                self.reply(chat_id, reply).await
            }
            BotCommand::Done(None) => {
                let menu = self.service.done_menu().await;
                self.send_menu(chat_id, "What did you finish?", "Nothing left to mark done today.", &menu, DONE_PREFIX)
                    .await
            }
            BotCommand::Delete(Some(id)) => {
                let reply = deletion_reply(self.service.delete(&id).await);
                self.reply(chat_id, reply).await
            }
            BotCommand::Delete(None) => {
                let menu = self.service.delete_menu().await;
                self.send_menu(chat_id, "Which task should go?", "No active tasks to delete.", &menu, DELETE_PREFIX)
                    .await
            }
            BotCommand::Test => match self.service.test_nudge().await {
                Ok(_) => Ok(()),
                Err(e) => self.reply(chat_id, &format!("Test nudge failed: {e}")).await,
            },
            BotCommand::Help | BotCommand::Unknown(_) => self.reply(chat_id, HELP_TEXT).await,
            BotCommand::Invalid(reply) => self.reply(chat_id, &reply).await,
        }
    }

    async fn handle_start(&self, message: &Message) -> Result<(), TelegramError> {
        let chat_id = message.chat.id;
        if !self.chat.bind_if_unset(chat_id) {
            tracing::warn!(chat_id, "ignoring /start from a chat other than the bound one");
            return Ok(());
        }
        tracing::info!(chat_id, "telegram chat bound");

        let name = message
            .from
            .as_ref()
            .map(|user| user.first_name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("there");
        let greeting = format!(
            "Hello {name}. I am online.\n\n\
             I will gently nudge you about your goals.\n\
             To add a one-off task, type: /add Call mom\n\
             To see today's plan, type: /list"
        );
        self.reply(chat_id, &greeting).await
    }

    async fn handle_callback(&self, query: CallbackQuery) -> Result<(), TelegramError> {
        self.client.answer_callback_query(&query.id).await?;

        let Some(message) = query.message else {
            return Ok(());
        };
        if !self.chat.accepts(message.chat.id) {
            return Ok(());
        }

        let text = match query.data.as_deref().and_then(parse_callback) {
            Some(CallbackAction::Done(id)) => completion_reply(self.service.complete(&id).await),
            Some(CallbackAction::Delete(id)) => deletion_reply(self.service.delete(&id).await),
            None => return Ok(()),
        };
        self.client
            .edit_message_text(message.chat.id, message.message_id, text)
            .await
    }

    async fn send_menu(
        &self,
        chat_id: i64,
        prompt: &str,
        empty: &str,
        entries: &[MenuEntry],
        prefix: &str,
    ) -> Result<(), TelegramError> {
        if entries.is_empty() {
            return self.reply(chat_id, empty).await;
        }
        let markup = InlineKeyboardMarkup::single_column(
            entries
                .iter()
                .map(|entry| InlineKeyboardButton::callback(entry.text.clone(), format!("{prefix}{}", entry.id))),
        );
        self.client.send_message(chat_id, prompt, None, Some(markup)).await?;
        Ok(())
    }

    async fn reply(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.client.send_message(chat_id, text, None, None).await?;
        Ok(())
    }
}

fn completion_reply(result: Result<CompletionOutcome, DomainError>) -> &'static str {
    match result {
        Ok(CompletionOutcome::Completed) => "✅ Well done. Task marked complete.",
        Ok(CompletionOutcome::AlreadyCompleted) => "✅ Already marked complete today.",
        Ok(CompletionOutcome::UnknownTask) => "That task is not on today's list anymore.",
        Err(_) => "Could not record that right now. Please try again.",
    }
}

fn deletion_reply(result: Result<DeletionOutcome, DomainError>) -> &'static str {
    match result {
        Ok(DeletionOutcome::Deleted) => "🗑️ Task deleted.",
        Ok(DeletionOutcome::NotFound) => "That task is not on today's active list.",
        Err(_) => "Could not delete that right now. Please try again.",
    }
}

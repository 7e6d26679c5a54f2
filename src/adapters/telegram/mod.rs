//! Telegram transport: Bot API client, nudge channel and command poller.

pub mod channel;
pub mod client;
pub mod commands;
pub mod poller;

pub use channel::{ChatBinding, TelegramChannel};
pub use client::{TelegramClient, TelegramClientConfig, TelegramError};
pub use poller::TelegramPoller;

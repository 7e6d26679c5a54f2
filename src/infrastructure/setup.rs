//! Setup and wiring
//!
//! Handles project initialization and builds the running service:
//! - Default config file creation
//! - Persistence backend selection with in-memory fallback
//! - Notification channel selection

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::adapters::clock::SystemClock;
use crate::adapters::console::LogChannel;
use crate::adapters::file::JsonFileDailyStateRepository;
use crate::adapters::memory::InMemoryDailyStateRepository;
use crate::adapters::sqlite::{database_url, initialize_database, PoolConfig, SqliteDailyStateRepository};
use crate::adapters::telegram::{ChatBinding, TelegramChannel, TelegramClient, TelegramClientConfig};
use crate::domain::models::{Config, StorageBackend};
use crate::domain::ports::{DailyStateRepository, NotificationChannel};
use crate::services::nudge_scheduler::NudgeScheduler;
use crate::services::nudge_service::NudgeService;
use crate::services::quote_book::QuoteBook;
use crate::services::task_store::TaskStore;

/// Default configuration template content
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Nudge configuration
# Override settings by editing this file, adding nudge.local.yaml, or setting
# environment variables with the NUDGE_ prefix (use __ for nesting).
#
# Example environment variables:
#   export NUDGE_ENGINE__CAPACITY=10
#   export NUDGE_STORAGE__BACKEND=file
#   export NUDGE_LOGGING__LEVEL=debug
#   export TELEGRAM_TOKEN=123456:ABC...

# Identity the stored state is keyed by
subscriber_id: "default"

engine:
  # Soft limit on active tasks; urgent tasks always get in
  capacity: 15
  # Minimum seconds between two nudges
  cooldown_secs: 3600
  # Seconds between scheduler ticks
  tick_interval_secs: 60

clock:
  # Local time is UTC plus this many minutes (330 = IST)
  utc_offset_minutes: 330

storage:
  # sqlite, file or memory
  backend: "sqlite"
  database_path: ".nudge/nudge.db"
  state_file: "user_state.json"

logging:
  # Log level: trace, debug, info, warn, error
  level: "info"
  # Log format: json, pretty
  format: "pretty"
  # Rotation of files in log_dir: daily, hourly, never
  rotation: "daily"
  retention_days: 30

server:
  enabled: true
  host: "0.0.0.0"
  port: 8080

telegram:
  # Leave unset to print nudges to the console instead
  # token: "123456:ABC..."
  # chat_id: 123456789
  poll_timeout_secs: 30

# Recurring goals. days: 0 = Monday .. 6 = Sunday; window is [hour_start, hour_end)
# Omit this key to use the built-in goals.
# goals:
#   - id: "work_dsa"
#     text: "1 DSA Question"
#     days: [0, 1, 2, 3, 4, 5, 6]
#     hour_start: 14
#     hour_end: 17
#     persona: "stoic_resilience"
"#;

/// Write the default config file. Returns false if it exists and `force` is unset.
pub fn create_config_file(path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE).context("Failed to write config file")?;
    Ok(true)
}

/// Open the configured repository.
///
/// Any failure to open durable storage is logged and replaced by an
/// in-memory repository for the life of the process.
pub async fn open_repository(config: &Config) -> Arc<dyn DailyStateRepository> {
    let capacity = config.engine.capacity;
    let storage = &config.storage;

    match storage.backend {
        StorageBackend::Memory => Arc::new(InMemoryDailyStateRepository::new()),
        StorageBackend::Sqlite => {
            let url = database_url(&storage.database_path);
            match initialize_database(&url, Some(PoolConfig::from(storage))).await {
                Ok(pool) => Arc::new(SqliteDailyStateRepository::new(pool, config.subscriber_id.clone(), capacity)),
                Err(e) => fallback(storage.backend, &e.to_string()),
            }
        }
        StorageBackend::File => {
            let repo = JsonFileDailyStateRepository::new(&storage.state_file, capacity);
            match repo.load().await {
                Ok(_) => Arc::new(repo),
                Err(e) => fallback(storage.backend, &e.to_string()),
            }
        }
    }
}

fn fallback(backend: StorageBackend, error: &str) -> Arc<dyn DailyStateRepository> {
    tracing::warn!(
        backend = backend.as_str(),
        error,
        "persistence unavailable; running with in-memory state until restart"
    );
    Arc::new(InMemoryDailyStateRepository::new())
}

/// Telegram pieces shared between the channel and the poller.
pub struct TelegramParts {
    pub client: Arc<TelegramClient>,
    pub chat: ChatBinding,
}

/// A fully wired service.
pub struct App {
    pub config: Config,
    pub service: Arc<NudgeService>,
    pub telegram: Option<TelegramParts>,
}

impl App {
    pub async fn build(config: Config) -> Result<Self> {
        let clock = SystemClock::with_offset_minutes(config.clock.utc_offset_minutes)
            .context("Invalid clock configuration")?;
        let repo = open_repository(&config).await;
        let backend = repo.backend();

        let telegram = match config.telegram.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => {
                let client = TelegramClient::with_config(TelegramClientConfig {
                    token: token.to_string(),
                    api_base: config.telegram.api_base.clone(),
                    poll_timeout_secs: config.telegram.poll_timeout_secs,
                })
                .context("Failed to build Telegram client")?;
                Some(TelegramParts {
                    client: Arc::new(client),
                    chat: ChatBinding::new(config.telegram.chat_id),
                })
            }
            _ => None,
        };

        let channel: Arc<dyn NotificationChannel> = match &telegram {
            Some(parts) => Arc::new(TelegramChannel::new(parts.client.clone(), parts.chat.clone())),
            None => Arc::new(LogChannel),
        };

        let store = TaskStore::new(repo, Arc::new(clock), config.engine.capacity);
        let service = NudgeService::new(
            store,
            NudgeScheduler::new(config.engine.cooldown_secs),
            QuoteBook::from_config(&config.quotes),
            config.goals.clone(),
            channel,
        );

        tracing::debug!(
            backend,
            telegram = telegram.is_some(),
            goals = config.goals.len(),
            "service wired"
        );

        Ok(Self {
            config,
            service: Arc::new(service),
            telegram,
        })
    }
}

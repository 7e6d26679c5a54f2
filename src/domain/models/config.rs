use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::task::{RecurringGoal, DEFAULT_PERSONA};

/// Main configuration structure for the nudge service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Fixed identity the persisted state is keyed by (single tenant)
    #[serde(default = "default_subscriber_id")]
    pub subscriber_id: String,

    /// Admission and scheduling parameters
    #[serde(default)]
    pub engine: EngineConfig,

    /// Time zone policy
    #[serde(default)]
    pub clock: ClockConfig,

    /// Persistence configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Keep-alive HTTP endpoint
    #[serde(default)]
    pub server: ServerConfig,

    /// Telegram transport
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Recurring goals, read-only after startup
    #[serde(default = "default_goals")]
    pub goals: Vec<RecurringGoal>,

    /// Quote pools by persona
    #[serde(default)]
    pub quotes: QuotesConfig,
}

fn default_subscriber_id() -> String {
    "default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subscriber_id: default_subscriber_id(),
            engine: EngineConfig::default(),
            clock: ClockConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
            telegram: TelegramConfig::default(),
            goals: default_goals(),
            quotes: QuotesConfig::default(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Soft limit on the active list for non-urgent admissions
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Minimum seconds between two nudges
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: i64,

    /// Seconds between scheduler ticks
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,

    /// Delay before the first tick after startup
    #[serde(default = "default_first_tick_delay_secs")]
    pub first_tick_delay_secs: u64,

    /// Consecutive failed ticks before the daemon stops
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
}

const fn default_capacity() -> usize {
    15
}

const fn default_cooldown_secs() -> i64 {
    3600
}

const fn default_tick_interval_secs() -> u64 {
    60
}

const fn default_first_tick_delay_secs() -> u64 {
    10
}

const fn default_max_consecutive_failures() -> u32 {
    5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            cooldown_secs: default_cooldown_secs(),
            tick_interval_secs: default_tick_interval_secs(),
            first_tick_delay_secs: default_first_tick_delay_secs(),
            max_consecutive_failures: default_max_consecutive_failures(),
        }
    }
}

/// Clock configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClockConfig {
    /// Offset from UTC in minutes applied to every local date and hour
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

/// IST, UTC+05:30.
const fn default_utc_offset_minutes() -> i32 {
    330
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset_minutes(),
        }
    }
}

/// Which persistence backend holds the daily state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    File,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::File => "file",
            Self::Memory => "memory",
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,

    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Path to the JSON state file used by the `file` backend
    #[serde(default = "default_state_file")]
    pub state_file: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

const fn default_backend() -> StorageBackend {
    StorageBackend::Sqlite
}

fn default_database_path() -> String {
    ".nudge/nudge.db".to_string()
}

fn default_state_file() -> String {
    "user_state.json".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            database_path: default_database_path(),
            state_file: default_state_file(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,

    /// Number of days to retain logs
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

const fn default_retention_days() -> u32 {
    30
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
            retention_days: default_retention_days(),
        }
    }
}

/// Keep-alive server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

const fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Telegram configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TelegramConfig {
    /// Bot token; the transport is disabled when unset
    #[serde(default)]
    pub token: Option<String>,

    /// Chat to nudge; bound by `/start` when unset
    #[serde(default)]
    pub chat_id: Option<i64>,

    /// Long-poll timeout for `getUpdates`
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    /// Bot API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

const fn default_poll_timeout_secs() -> u64 {
    30
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            chat_id: None,
            poll_timeout_secs: default_poll_timeout_secs(),
            api_base: default_api_base(),
        }
    }
}

/// Quote table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct QuotesConfig {
    /// Persona used when a requested persona has no pool
    #[serde(default = "default_fallback_persona")]
    pub fallback_persona: String,

    /// Quote pools keyed by persona
    #[serde(default = "default_quote_pools")]
    pub pools: BTreeMap<String, Vec<String>>,
}

fn default_fallback_persona() -> String {
    DEFAULT_PERSONA.to_string()
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            fallback_persona: default_fallback_persona(),
            pools: default_quote_pools(),
        }
    }
}

fn default_goals() -> Vec<RecurringGoal> {
    const WEEKDAYS: [u8; 5] = [0, 1, 2, 3, 4];
    const WEEKEND: [u8; 2] = [5, 6];
    const EVERY_DAY: [u8; 7] = [0, 1, 2, 3, 4, 5, 6];

    vec![
        RecurringGoal::new("work_prod", "1 hr Product Knowledge/Integration", WEEKDAYS, (9, 12), "alain_meaning"),
        RecurringGoal::new("work_build", "Build Product / Tech Blogs", WEEKEND, (10, 14), "maker_creativity"),
        RecurringGoal::new("work_dsa", "1 DSA Question", EVERY_DAY, (14, 17), "stoic_resilience"),
        RecurringGoal::new("work_german", "German Lesson", EVERY_DAY, (18, 20), "mindful_learning"),
        RecurringGoal::new("pers_meditate", "Meditate", EVERY_DAY, (7, 9), "mindful_learning"),
        RecurringGoal::new("pers_water", "Drink 3L Water", EVERY_DAY, (10, 20), "general_encourage"),
    ]
}

fn default_quote_pools() -> BTreeMap<String, Vec<String>> {
    let pools: [(&str, &[&str]); 5] = [
        (
            "alain_meaning",
            &[
                "“Work is one of the ways in which we can dignify our suffering.” — Alain de Botton",
                "“Anxiety is the handmaiden of contemporary ambition.” — Alain de Botton",
                "“It is not that we are not good enough, but that we are judging ourselves by a standard that is impossible.” — Alain de Botton",
            ],
        ),
        (
            "maker_creativity",
            &[
                "“The way to do great work is to love what you do.” — Steve Jobs",
                "“Make something people want.” — Paul Graham",
                "“Amateurs sit and wait for inspiration, the rest of us just get up and go to work.” — Stephen King",
            ],
        ),
        (
            "stoic_resilience",
            &[
                "“We suffer more often in imagination than in reality.” — Seneca",
                "“The impediment to action advances action. What stands in the way becomes the way.” — Marcus Aurelius",
                "“Do not seek for things to happen the way you want them to; rather, wish that what happens happen the way it happens.” — Epictetus",
            ],
        ),
        (
            "mindful_learning",
            &[
                "“The present moment is filled with joy and happiness. If you are attentive, you will see it.” — Thich Nhat Hanh",
                "“Awareness is the greatest agent for change.” — Eckhart Tolle",
                "“Don’t worry about the future. Just be here now.” — Diana Winston",
            ],
        ),
        (
            "general_encourage",
            &[
                "“The secret of getting ahead is getting started.” — Mark Twain",
                "“Small progress is still progress.”",
                "“You don’t have to see the whole staircase, just take the first step.” — Martin Luther King Jr.",
            ],
        ),
    ];

    pools
        .iter()
        .map(|(persona, quotes)| {
            (
                (*persona).to_string(),
                quotes.iter().map(|q| (*q).to_string()).collect(),
            )
        })
        .collect()
}

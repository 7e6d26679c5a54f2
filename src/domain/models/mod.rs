pub mod config;
pub mod daily_state;
pub mod nudge;
pub mod task;

pub use config::{
    ClockConfig, Config, EngineConfig, LoggingConfig, QuotesConfig, ServerConfig, StorageBackend,
    StorageConfig, TelegramConfig,
};
pub use daily_state::{decode_record, encode_record, DailyState};
pub use nudge::{
    Admission, Agenda, AgendaItem, CompletionOutcome, DeletionOutcome, MenuEntry, Nudge,
    TickOutcome,
};
pub use task::{AdHocTask, Placement, RecurringGoal, Task, DEFAULT_PERSONA};

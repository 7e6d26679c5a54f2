//! Nudge - a single-tenant accountability bot
//!
//! Nudge keeps a short list of today's tasks, re-elects it at local
//! midnight, and periodically reminds its one user about something still
//! open, paired with a motivational quote.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, errors and port traits
//! - **Service Layer** (`services`): Admission, election, scheduling and the daemon
//! - **Adapters** (`adapters`): Clock, storage backends, Telegram, keep-alive server
//! - **Infrastructure Layer** (`infrastructure`): Configuration, logging and wiring
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use nudge::infrastructure::{config::ConfigLoader, setup::App};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::build(ConfigLoader::load(None)?).await?;
//!     println!("{}", app.service.agenda().await.to_text());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    AdHocTask, Admission, Agenda, CompletionOutcome, Config, DailyState, DeletionOutcome, Nudge,
    Placement, RecurringGoal, Task, TickOutcome,
};
pub use domain::ports::{Clock, ClockReading, DailyStateRepository, NotificationChannel};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{NudgeService, SubmitRequest, TaskStore};

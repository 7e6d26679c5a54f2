//! Engine services.
//!
//! Pure policies (admission, rollover, completion, scheduling) plus the
//! stateful pieces that drive them: the task store, the service facade and
//! the tick daemon.

pub mod admission;
pub mod completion;
pub mod nudge_daemon;
pub mod nudge_scheduler;
pub mod nudge_service;
pub mod quote_book;
pub mod rollover;
pub mod task_store;

pub use admission::{AdmissionController, SubmitRequest};
pub use nudge_daemon::{DaemonHandle, NudgeDaemon, NudgeDaemonConfig, NudgeDaemonEvent, StopReason};
pub use nudge_scheduler::{NudgeDecision, NudgeScheduler};
pub use nudge_service::{NudgeService, ServiceStatus};
pub use quote_book::QuoteBook;
pub use task_store::TaskStore;

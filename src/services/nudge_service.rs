//! Nudge service.
//!
//! Facade over the task store and the engine components. Every command
//! surface (CLI, chat poller, daemon, keep-alive server) goes through here.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Admission, Agenda, AgendaItem, CompletionOutcome, DeletionOutcome, MenuEntry, Nudge,
    RecurringGoal, Task, TickOutcome,
};
use crate::domain::ports::NotificationChannel;
use crate::services::admission::{AdmissionController, SubmitRequest};
use crate::services::completion;
use crate::services::nudge_scheduler::{NudgeDecision, NudgeScheduler};
use crate::services::quote_book::QuoteBook;
use crate::services::task_store::TaskStore;

pub const TEST_NUDGE_ID: &str = "test_task";
const TEST_NUDGE_TEXT: &str = "Test Nudge (You are building this!)";
const TEST_NUDGE_PERSONA: &str = "maker_creativity";

/// Snapshot of the service for health checks and `status` output.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub date: String,
    pub active: usize,
    pub backlog: usize,
    pub completed: usize,
    pub last_nudge_at: i64,
    pub backend: &'static str,
    pub channel: &'static str,
}

pub struct NudgeService {
    store: TaskStore,
    admission: AdmissionController,
    scheduler: NudgeScheduler,
    quotes: QuoteBook,
    goals: Vec<RecurringGoal>,
    channel: Arc<dyn NotificationChannel>,
}

impl NudgeService {
    pub fn new(
        store: TaskStore,
        scheduler: NudgeScheduler,
        quotes: QuoteBook,
        goals: Vec<RecurringGoal>,
        channel: Arc<dyn NotificationChannel>,
    ) -> Self {
        let admission = AdmissionController::new(store.capacity());
        Self {
            store,
            admission,
            scheduler,
            quotes,
            goals,
            channel,
        }
    }

    pub fn goals(&self) -> &[RecurringGoal] {
        &self.goals
    }

    /// Admit a new ad-hoc task.
    pub async fn add(&self, request: SubmitRequest) -> DomainResult<Admission> {
        let admission = self
            .store
            .mutate(|state, now| self.admission.submit(state, request, now.epoch_secs))
            .await?;

        tracing::info!(
            task_id = %admission.task.id,
            placement = admission.placement.as_str(),
            urgent = admission.task.is_urgent,
            "task added"
        );
        Ok(admission)
    }

    pub async fn complete(&self, task_id: &str) -> DomainResult<CompletionOutcome> {
        let task_id = task_id.trim();
        let outcome = self
            .store
            .mutate(|state, _| Ok(completion::complete(state, &self.goals, task_id)))
            .await?;
        tracing::info!(task_id, ?outcome, "completion handled");
        Ok(outcome)
    }

    pub async fn delete(&self, task_id: &str) -> DomainResult<DeletionOutcome> {
        let task_id = task_id.trim();
        let outcome = self
            .store
            .mutate(|state, _| Ok(completion::delete(state, task_id)))
            .await?;
        tracing::info!(task_id, ?outcome, "deletion handled");
        Ok(outcome)
    }

    /// Today's agenda: goals scheduled for today, active tasks and backlog.
    pub async fn agenda(&self) -> Agenda {
        let (state, now) = self.store.snapshot().await;

        let recurring = self
            .goals
            .iter()
            .filter(|goal| goal.applies_on(now.weekday))
            .map(|goal| AgendaItem::from_goal(goal, state.is_completed(&goal.id)))
            .collect();
        let active = state
            .active
            .iter()
            .map(|task| AgendaItem::from_task(task, state.is_completed(&task.id)))
            .collect();
        let backlog = state
            .backlog
            .iter()
            .map(|task| AgendaItem::from_task(task, false))
            .collect();

        Agenda {
            date: now.date.to_string(),
            weekday: now.weekday_name().to_string(),
            recurring,
            active,
            backlog,
            completed_count: state.completed_ids.len(),
        }
    }

    /// Ids that `complete` would accept right now and that are still open.
    pub async fn done_menu(&self) -> Vec<MenuEntry> {
        let (state, now) = self.store.snapshot().await;

        let goals = self
            .goals
            .iter()
            .filter(|goal| goal.applies_on(now.weekday) && !state.is_completed(&goal.id))
            .map(|goal| MenuEntry { id: goal.id.clone(), text: goal.text.clone() });
        let tasks = state
            .active
            .iter()
            .filter(|task| !state.is_completed(&task.id))
            .map(|task| MenuEntry { id: task.id.clone(), text: task.text.clone() });

        goals.chain(tasks).collect()
    }

    /// Ids that `delete` would remove.
    pub async fn delete_menu(&self) -> Vec<MenuEntry> {
        let (state, _) = self.store.snapshot().await;
        state
            .active
            .iter()
            .map(|task| MenuEntry { id: task.id.clone(), text: task.text.clone() })
            .collect()
    }

    /// One scheduler pass.
    ///
    /// The cool-down timestamp is persisted before the nudge goes out, so a
    /// delivery failure still counts as a nudge and is not retried early.
    /// Without a recipient the tick is skipped and the cool-down is untouched.
    pub async fn tick(&self) -> DomainResult<TickOutcome> {
        if !self.channel.is_ready() {
            tracing::debug!(channel = self.channel.name(), "tick skipped: no recipient bound");
            return Ok(TickOutcome::NoRecipient);
        }

        let decision = self
            .store
            .mutate(|state, now| {
                let decision = self.scheduler.decide(state, &self.goals, now);
                if matches!(decision, NudgeDecision::Nudge(_)) {
                    state.last_nudge_at = now.epoch_secs;
                }
                Ok(decision)
            })
            .await?;

        match decision {
            NudgeDecision::CoolingDown { remaining_secs } => {
                tracing::trace!(remaining_secs, "tick skipped: cooling down");
                Ok(TickOutcome::CoolingDown { remaining_secs })
            }
            NudgeDecision::NoCandidates => {
                tracing::trace!("tick skipped: no candidates");
                Ok(TickOutcome::NoCandidates)
            }
            NudgeDecision::Nudge(task) => {
                let nudge = self.build_nudge(&task);
                self.emit(&nudge).await?;
                Ok(TickOutcome::Nudged { nudge })
            }
        }
    }

    /// Send a mock nudge without touching state.
    pub async fn test_nudge(&self) -> DomainResult<Nudge> {
        let nudge = Nudge {
            task_id: TEST_NUDGE_ID.to_string(),
            task_text: TEST_NUDGE_TEXT.to_string(),
            quote: self.quotes.pick(TEST_NUDGE_PERSONA),
            persona: TEST_NUDGE_PERSONA.to_string(),
        };
        self.emit(&nudge).await?;
        Ok(nudge)
    }

    pub async fn status(&self) -> ServiceStatus {
        let (state, _) = self.store.snapshot().await;
        ServiceStatus {
            date: state.logical_date.to_string(),
            active: state.active.len(),
            backlog: state.backlog.len(),
            completed: state.completed_ids.len(),
            last_nudge_at: state.last_nudge_at,
            backend: self.store.backend(),
            channel: self.channel.name(),
        }
    }

    fn build_nudge(&self, task: &Task) -> Nudge {
        Nudge {
            task_id: task.id().to_string(),
            task_text: task.text().to_string(),
            quote: self.quotes.pick(task.persona()),
            persona: task.persona().to_string(),
        }
    }

    async fn emit(&self, nudge: &Nudge) -> DomainResult<()> {
        match self.channel.emit_nudge(nudge).await {
            Ok(()) => {
                tracing::info!(task_id = %nudge.task_id, channel = self.channel.name(), "nudge sent");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    task_id = %nudge.task_id,
                    channel = self.channel.name(),
                    error = %e,
                    "nudge delivery failed"
                );
                Err(match e {
                    DomainError::NotificationFailed(msg) => DomainError::NotificationFailed(msg),
                    other => DomainError::NotificationFailed(other.to_string()),
                })
            }
        }
    }
}

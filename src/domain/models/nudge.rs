//! Nudge and command-surface result models.

use serde::{Deserialize, Serialize};

use super::task::{AdHocTask, Placement, RecurringGoal};

/// Semantic content of one outbound nudge.
///
/// Transport adapters turn this into chat markup; `task_id` is the key the
/// user's "done" signal comes back with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nudge {
    pub task_id: String,
    pub task_text: String,
    pub quote: String,
    pub persona: String,
}

/// Result of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Admission {
    pub task: AdHocTask,
    pub placement: Placement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionOutcome {
    Completed,
    AlreadyCompleted,
    /// The id is neither an active task nor a configured goal; nothing changed.
    UnknownTask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionOutcome {
    Deleted,
    NotFound,
}

/// What one scheduler pass did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TickOutcome {
    CoolingDown { remaining_secs: i64 },
    NoCandidates,
    /// Nobody to nudge yet; the scheduler did not run.
    NoRecipient,
    Nudged { nudge: Nudge },
}

/// An entry in an agenda section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgendaItem {
    pub id: String,
    pub text: String,
    pub done: bool,
}

impl AgendaItem {
    pub fn from_goal(goal: &RecurringGoal, done: bool) -> Self {
        Self { id: goal.id.clone(), text: goal.text.clone(), done }
    }

    pub fn from_task(task: &AdHocTask, done: bool) -> Self {
        Self { id: task.id.clone(), text: task.text.clone(), done }
    }
}

/// Rendering of today's state for the `list` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agenda {
    pub date: String,
    pub weekday: String,
    pub recurring: Vec<AgendaItem>,
    pub active: Vec<AgendaItem>,
    pub backlog: Vec<AgendaItem>,
    pub completed_count: usize,
}

impl Agenda {
    /// Plain-text rendering shared by the CLI and chat transports.
    pub fn to_text(&self) -> String {
        let mut lines = vec![format!("Your agenda for today ({}, {})", self.weekday, self.date)];

        lines.push(String::new());
        lines.push("Recurring:".to_string());
        if self.recurring.is_empty() {
            lines.push("  No recurring goals for today.".to_string());
        }
        lines.extend(self.recurring.iter().map(AgendaItem::line));

        lines.push(String::new());
        lines.push("Active:".to_string());
        if self.active.is_empty() {
            lines.push("  No extra tasks added.".to_string());
        }
        lines.extend(self.active.iter().map(AgendaItem::line));

        if !self.backlog.is_empty() {
            lines.push(String::new());
            lines.push(format!("Backlog ({}):", self.backlog.len()));
            lines.extend(self.backlog.iter().map(|item| format!("  - {}", item.text)));
        }

        lines.push(String::new());
        lines.push(format!("Completed today: {}", self.completed_count));
        lines.join("\n")
    }
}

impl AgendaItem {
    fn line(&self) -> String {
        let mark = if self.done { "✅" } else { "⬜️" };
        format!("  {mark} {}", self.text)
    }
}

/// An id the user may act on, with its display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub id: String,
    pub text: String,
}

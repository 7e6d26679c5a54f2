//! Task domain models.
//!
//! Two kinds of task share one shape: recurring goals come from
//! configuration and are never persisted, ad-hoc tasks are submitted by the
//! user and live in the daily state's `active` or `backlog` list.

use serde::{Deserialize, Serialize};

/// Persona used when a task does not name one.
pub const DEFAULT_PERSONA: &str = "general_encourage";

/// A recurring goal, evaluated every tick against the current weekday and hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringGoal {
    pub id: String,
    pub text: String,
    /// Applicable weekdays, 0 = Monday .. 6 = Sunday.
    #[serde(alias = "days")]
    pub weekdays: Vec<u8>,
    /// Inclusive start of the eligibility window.
    #[serde(alias = "hour_start")]
    pub window_start_hour: u8,
    /// Exclusive end of the eligibility window.
    #[serde(alias = "hour_end")]
    pub window_end_hour: u8,
    #[serde(default = "default_persona")]
    pub persona: String,
}

impl RecurringGoal {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        weekdays: impl Into<Vec<u8>>,
        window: (u8, u8),
        persona: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            weekdays: weekdays.into(),
            window_start_hour: window.0,
            window_end_hour: window.1,
            persona: persona.into(),
        }
    }

    pub fn applies_on(&self, weekday: u8) -> bool {
        self.weekdays.contains(&weekday)
    }

    pub fn in_window(&self, hour: u8) -> bool {
        self.window_start_hour <= hour && hour < self.window_end_hour
    }
}

/// A user-submitted task.
///
/// Every field is mandatory once deserialized; records written by older
/// versions get their defaults here and nowhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdHocTask {
    pub id: String,
    pub text: String,
    #[serde(default = "default_persona")]
    pub persona: String,
    /// Hour of day (0-23) before which the task is not nudged.
    #[serde(default)]
    pub earliest_eligible_hour: u8,
    #[serde(default)]
    pub is_urgent: bool,
    /// Creation time in epoch seconds; FIFO tie-break during the election.
    #[serde(default)]
    pub created_at: i64,
}

impl AdHocTask {
    pub fn new(id: impl Into<String>, text: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            persona: default_persona(),
            earliest_eligible_hour: 0,
            is_urgent: false,
            created_at,
        }
    }

    pub fn urgent(mut self, is_urgent: bool) -> Self {
        self.is_urgent = is_urgent;
        self
    }

    pub fn not_before(mut self, hour: u8) -> Self {
        self.earliest_eligible_hour = hour;
        self
    }

    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    pub fn is_eligible_at(&self, hour: u8) -> bool {
        hour >= self.earliest_eligible_hour
    }
}

fn default_persona() -> String {
    DEFAULT_PERSONA.to_string()
}

/// Either kind of task, as surfaced to the scheduler and the agenda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Task {
    RecurringGoal(RecurringGoal),
    AdHoc(AdHocTask),
}

impl Task {
    pub fn id(&self) -> &str {
        match self {
            Self::RecurringGoal(goal) => &goal.id,
            Self::AdHoc(task) => &task.id,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::RecurringGoal(goal) => &goal.text,
            Self::AdHoc(task) => &task.text,
        }
    }

    pub fn persona(&self) -> &str {
        match self {
            Self::RecurringGoal(goal) => &goal.persona,
            Self::AdHoc(task) => &task.persona,
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::RecurringGoal(_) => "recurring_goal",
            Self::AdHoc(_) => "ad_hoc",
        }
    }
}

/// Where an admitted task was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Active,
    Backlog,
}

impl Placement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Backlog => "backlog",
        }
    }
}

//! Daily state domain model.
//!
//! A `DailyState` is the single unit of persisted state: the day's active
//! and backlog lists, the ids completed today, and the time of the last
//! nudge. It is always replaced wholesale, never patched field by field.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::task::AdHocTask;
use crate::domain::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyState {
    #[serde(rename = "date")]
    pub logical_date: NaiveDate,
    #[serde(default, alias = "active_tasks")]
    pub active: Vec<AdHocTask>,
    #[serde(default)]
    pub backlog: Vec<AdHocTask>,
    #[serde(default, alias = "completed")]
    pub completed_ids: Vec<String>,
    /// Epoch seconds of the last emitted nudge, 0 if none yet.
    #[serde(default, alias = "last_nudge_time", deserialize_with = "epoch_secs")]
    pub last_nudge_at: i64,
}

impl DailyState {
    /// Fresh, empty state for `date`.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            logical_date: date,
            active: Vec::new(),
            backlog: Vec::new(),
            completed_ids: Vec::new(),
            last_nudge_at: 0,
        }
    }

    pub fn is_completed(&self, id: &str) -> bool {
        self.completed_ids.iter().any(|c| c == id)
    }

    pub fn find_active(&self, id: &str) -> Option<&AdHocTask> {
        self.active.iter().find(|t| t.id == id)
    }

    /// Whether `id` is already used by a task or a completion today.
    pub fn contains_id(&self, id: &str) -> bool {
        self.active.iter().chain(self.backlog.iter()).any(|t| t.id == id) || self.is_completed(id)
    }

    /// Number of active tasks not yet completed.
    pub fn pending_active(&self) -> usize {
        self.active.iter().filter(|t| !self.is_completed(&t.id)).count()
    }
}

/// Accepts integral or fractional epoch seconds.
fn epoch_secs<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    #[allow(clippy::cast_possible_truncation)]
    Ok(secs as i64)
}

/// Record shape written by the first version of the bot, before the
/// active/backlog split.
#[derive(Debug, Deserialize)]
struct LegacyRecord {
    date: NaiveDate,
    #[serde(default)]
    completed: Vec<String>,
    dynamic_tasks: Vec<AdHocTask>,
}

/// Decode a persisted record, upgrading the legacy shape when detected.
pub fn decode_record(json: &str, capacity: usize) -> DomainResult<DailyState> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.get("dynamic_tasks").is_some() {
        let legacy: LegacyRecord = serde_json::from_value(value)?;
        return Ok(upgrade_legacy_record(legacy, capacity));
    }
    serde_json::from_value(value).map_err(|e| DomainError::SerializationError(e.to_string()))
}

/// Encode a state as its persisted record.
pub fn encode_record(state: &DailyState) -> DomainResult<String> {
    Ok(serde_json::to_string(state)?)
}

/// One-time upgrade of a legacy record: stored tasks are admitted in order,
/// the first `capacity` to `active` and the rest to `backlog`.
fn upgrade_legacy_record(legacy: LegacyRecord, capacity: usize) -> DailyState {
    let mut state = DailyState::new(legacy.date);
    for task in legacy.dynamic_tasks {
        if state.contains_id(&task.id) {
            continue;
        }
        if state.active.len() < capacity {
            state.active.push(task);
        } else {
            state.backlog.push(task);
        }
    }
    for id in legacy.completed {
        if !state.is_completed(&id) {
            state.completed_ids.push(id);
        }
    }
    tracing::info!(
        date = %state.logical_date,
        active = state.active.len(),
        backlog = state.backlog.len(),
        "upgraded legacy state record"
    );
    state
}

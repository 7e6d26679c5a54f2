//! Admission controller.
//!
//! Decides whether a newly submitted task enters the active list or the
//! backlog. Capacity is a soft limit that only applies to non-urgent tasks.

use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AdHocTask, Admission, DailyState, Placement};

/// A task submission as received from the command surface.
#[derive(Debug, Clone, Default)]
pub struct SubmitRequest {
    pub text: String,
    pub is_urgent: bool,
    pub earliest_eligible_hour: u8,
}

impl SubmitRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn urgent(mut self) -> Self {
        self.is_urgent = true;
        self
    }

    pub fn not_before(mut self, hour: u8) -> Self {
        self.earliest_eligible_hour = hour;
        self
    }
}

#[derive(Debug, Clone)]
pub struct AdmissionController {
    capacity: usize,
}

impl AdmissionController {
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Validate `request`, build the task and place it in `state`.
    ///
    /// On error `state` is left untouched.
    pub fn submit(
        &self,
        state: &mut DailyState,
        request: SubmitRequest,
        now_epoch_secs: i64,
    ) -> DomainResult<Admission> {
        let text = request.text.trim();
        if text.is_empty() {
            return Err(DomainError::InvalidInput(
                "task text cannot be empty".to_string(),
            ));
        }
        if request.earliest_eligible_hour > 23 {
            return Err(DomainError::InvalidInput(format!(
                "earliest eligible hour must be 0-23, got {}",
                request.earliest_eligible_hour
            )));
        }

        let task = AdHocTask::new(fresh_task_id(state), text, now_epoch_secs)
            .urgent(request.is_urgent)
            .not_before(request.earliest_eligible_hour);

        let placement = self.place(state, task.clone());
        tracing::debug!(
            task_id = %task.id,
            urgent = task.is_urgent,
            placement = placement.as_str(),
            active = state.active.len(),
            "task admitted"
        );

        Ok(Admission { task, placement })
    }

    /// Append `task` to the list its urgency and the current occupancy select.
    pub fn place(&self, state: &mut DailyState, task: AdHocTask) -> Placement {
        if task.is_urgent || state.active.len() < self.capacity {
            state.active.push(task);
            Placement::Active
        } else {
            state.backlog.push(task);
            Placement::Backlog
        }
    }
}

/// Short id not used by any task or completion in `state`.
pub fn fresh_task_id(state: &DailyState) -> String {
    loop {
        let simple = Uuid::new_v4().simple().to_string();
        let id = format!("t-{}", &simple[..8]);
        if !state.contains_id(&id) {
            return id;
        }
    }
}

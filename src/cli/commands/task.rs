//! Task commands: add, list, done, delete.

use anyhow::Result;
use clap::Args;
use std::path::Path;

use crate::adapters::telegram::commands::EVENING_HOUR;
use crate::cli::commands::build_app;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{
    Admission, Agenda, CompletionOutcome, DeletionOutcome, MenuEntry, Placement,
};
use crate::services::admission::SubmitRequest;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Task description
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,

    /// Admit the task even when the active list is full
    #[arg(short, long)]
    pub urgent: bool,

    /// Do not nudge about this task before this local hour (0-23)
    #[arg(long, value_name = "HH", value_parser = clap::value_parser!(u8).range(0..=23), conflicts_with = "evening")]
    pub after: Option<u8>,

    /// Shorthand for --after 18
    #[arg(long)]
    pub evening: bool,
}

impl AddArgs {
    pub fn to_request(&self) -> SubmitRequest {
        let hour = if self.evening { Some(EVENING_HOUR) } else { self.after };
        let request = SubmitRequest::new(self.text.join(" ")).not_before(hour.unwrap_or(0));
        if self.urgent {
            request.urgent()
        } else {
            request
        }
    }
}

#[derive(Args, Debug)]
pub struct ListArgs {}

#[derive(Args, Debug)]
pub struct DoneArgs {
    /// Task or goal id; omit to list what can be completed
    pub id: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Task id; omit to list what can be deleted
    pub id: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct AddOutput {
    #[serde(flatten)]
    pub admission: Admission,
}

impl CommandOutput for AddOutput {
    fn to_human(&self) -> String {
        let task = &self.admission.task;
        let mut line = format!("Added {}: {}", task.id, task.text);
        if task.is_urgent {
            line.push_str(" [urgent]");
        }
        if task.earliest_eligible_hour > 0 {
            line.push_str(&format!(" (after {:02}:00)", task.earliest_eligible_hour));
        }
        match self.admission.placement {
            Placement::Active => line,
            Placement::Backlog => {
                format!("{line}\nToday's list is full; the task was parked in the backlog.")
            }
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ListOutput {
    #[serde(flatten)]
    pub agenda: Agenda,
}

impl CommandOutput for ListOutput {
    fn to_human(&self) -> String {
        self.agenda.to_text()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct MenuOutput {
    pub action: &'static str,
    pub entries: Vec<MenuEntry>,
}

impl CommandOutput for MenuOutput {
    fn to_human(&self) -> String {
        if self.entries.is_empty() {
            return format!("Nothing to {}.", self.action);
        }
        let mut lines = vec![format!("Pass one of these ids to `{}`:", self.action)];
        lines.extend(
            self.entries
                .iter()
                .map(|entry| format!("  {:<14} {}", entry.id, entry.text)),
        );
        lines.join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
pub struct DoneOutput {
    pub id: String,
    pub outcome: CompletionOutcome,
}

impl CommandOutput for DoneOutput {
    fn to_human(&self) -> String {
        match self.outcome {
            CompletionOutcome::Completed => format!("Marked {} as done. Great job!", self.id),
            CompletionOutcome::AlreadyCompleted => format!("{} was already done today.", self.id),
            CompletionOutcome::UnknownTask => format!("No open task or goal with id {}.", self.id),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct DeleteOutput {
    pub id: String,
    pub outcome: DeletionOutcome,
}

impl CommandOutput for DeleteOutput {
    fn to_human(&self) -> String {
        match self.outcome {
            DeletionOutcome::Deleted => format!("Deleted {}.", self.id),
            DeletionOutcome::NotFound => format!("No active task with id {}.", self.id),
        }
    }
}

pub async fn execute_add(args: AddArgs, config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let app = build_app(config_path).await?;
    let admission = app.service.add(args.to_request()).await?;
    output(&AddOutput { admission }, json_mode);
    Ok(())
}

pub async fn execute_list(_args: ListArgs, config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let app = build_app(config_path).await?;
    let agenda = app.service.agenda().await;
    output(&ListOutput { agenda }, json_mode);
    Ok(())
}

pub async fn execute_done(args: DoneArgs, config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let app = build_app(config_path).await?;
    match args.id {
        Some(id) => {
            let outcome = app.service.complete(&id).await?;
            output(&DoneOutput { id, outcome }, json_mode);
        }
        None => {
            let entries = app.service.done_menu().await;
            output(&MenuOutput { action: "done", entries }, json_mode);
        }
    }
    Ok(())
}

pub async fn execute_delete(args: DeleteArgs, config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let app = build_app(config_path).await?;
    match args.id {
        Some(id) => {
            let outcome = app.service.delete(&id).await?;
            output(&DeleteOutput { id, outcome }, json_mode);
        }
        None => {
            let entries = app.service.delete_menu().await;
            output(&MenuOutput { action: "delete", entries }, json_mode);
        }
    }
    Ok(())
}

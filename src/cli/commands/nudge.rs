//! `tick` and `test-nudge`: one-off scheduler actions.

use anyhow::Result;
use std::path::Path;

use crate::adapters::console::render_plain;
use crate::cli::commands::build_app;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Nudge, TickOutcome};

#[derive(Debug, serde::Serialize)]
pub struct TickOutput {
    #[serde(flatten)]
    pub outcome: TickOutcome,
    pub channel: &'static str,
}

impl CommandOutput for TickOutput {
    fn to_human(&self) -> String {
        match &self.outcome {
            TickOutcome::CoolingDown { remaining_secs } => {
                format!("Cooling down; next nudge allowed in {}m {}s.", remaining_secs / 60, remaining_secs % 60)
            }
            TickOutcome::NoCandidates => "Nothing to nudge about right now.".to_string(),
            TickOutcome::NoRecipient => "No chat bound yet; send /start to the bot first.".to_string(),
            TickOutcome::Nudged { nudge } => {
                format!("Sent via {}:\n\n{}", self.channel, render_plain(nudge))
            }
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct TestNudgeOutput {
    pub nudge: Nudge,
    pub channel: &'static str,
}

impl CommandOutput for TestNudgeOutput {
    fn to_human(&self) -> String {
        format!("Test nudge sent via {}:\n\n{}", self.channel, render_plain(&self.nudge))
    }
}

pub async fn execute_tick(config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let app = build_app(config_path).await?;
    let outcome = app.service.tick().await?;
    let channel = app.service.status().await.channel;
    output(&TickOutput { outcome, channel }, json_mode);
    Ok(())
}

pub async fn execute_test_nudge(config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let app = build_app(config_path).await?;
    let nudge = app.service.test_nudge().await?;
    let channel = app.service.status().await.channel;
    output(&TestNudgeOutput { nudge, channel }, json_mode);
    Ok(())
}

//! CLI command implementations.

pub mod config;
pub mod init;
pub mod nudge;
pub mod run;
pub mod task;

use anyhow::Result;
use std::path::Path;

use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::setup::App;

/// Load configuration and wire the service for a one-shot command.
pub(crate) async fn build_app(config_path: Option<&Path>) -> Result<App> {
    let config = ConfigLoader::load(config_path)?;
    App::build(config).await
}

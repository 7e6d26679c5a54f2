//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::commands::config::ConfigArgs;
use crate::cli::commands::init::InitArgs;
use crate::cli::commands::run::RunArgs;
use crate::cli::commands::task::{AddArgs, DeleteArgs, DoneArgs, ListArgs};

#[derive(Parser, Debug)]
#[command(name = "nudge")]
#[command(about = "Nudge - a personal accountability bot", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file to load on top of nudge.yaml
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default nudge.yaml and prepare storage
    Init(InitArgs),

    /// Run the scheduler, chat poller and keep-alive server until interrupted
    Run(RunArgs),

    /// Add a task for today
    Add(AddArgs),

    /// Show today's agenda
    List(ListArgs),

    /// Mark a task or recurring goal done for today
    Done(DoneArgs),

    /// Remove a task from the active list
    Delete(DeleteArgs),

    /// Run one scheduler pass
    Tick,

    /// Send a test nudge without touching state
    TestNudge,

    /// Show the effective configuration
    Config(ConfigArgs),
}

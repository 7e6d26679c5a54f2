//! `nudge run`: the long-running service.
//!
//! Starts the tick daemon, the keep-alive server and the Telegram poller,
//! then waits for Ctrl-C (or for the daemon to give up) and shuts them
//! down together.

use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::adapters::http::KeepAliveServer;
use crate::adapters::telegram::TelegramPoller;
use crate::cli::output::{output, CommandOutput};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::{prune_expired_logs, LogConfig, LoggerImpl};
use crate::infrastructure::setup::App;
use crate::services::nudge_daemon::{NudgeDaemon, NudgeDaemonConfig, NudgeDaemonEvent, StopReason};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Do not start the keep-alive HTTP server
    #[arg(long)]
    pub no_server: bool,

    /// Do not poll Telegram for commands (nudges are still sent)
    #[arg(long)]
    pub no_poll: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct RunOutput {
    pub stop_reason: String,
    pub total_ticks: u64,
    pub nudges_sent: u64,
    pub failed_ticks: u64,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        format!(
            "Nudge stopped ({}): {} ticks, {} nudges sent, {} failed ticks",
            self.stop_reason, self.total_ticks, self.nudges_sent, self.failed_ticks
        )
    }
}

pub async fn execute(args: RunArgs, config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load(config_path)?;

    let log_config = LogConfig::from(&config.logging);
    let _logger = LoggerImpl::init(&log_config)?;
    if let Some(ref log_dir) = log_config.log_dir {
        if let Err(e) = prune_expired_logs(log_dir, log_config.retention_days).await {
            tracing::warn!(error = %e, "failed to prune old log files");
        }
    }

    let app = App::build(config).await?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let daemon = NudgeDaemon::new(app.service.clone(), NudgeDaemonConfig::from(&app.config.engine));
    let daemon_handle = daemon.handle();
    let events = daemon.spawn();
    let mut daemon_task = tokio::spawn(watch_daemon(events));

    let server_task = if app.config.server.enabled && !args.no_server {
        let server = KeepAliveServer::new(app.service.clone(), app.config.server.clone());
        let rx = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = server.serve_with_shutdown(wait_for_shutdown(rx)).await {
                tracing::error!(error = %e, "keep-alive server failed");
            }
        }))
    } else {
        None
    };

    let poller_task: Option<JoinHandle<()>> = match app.telegram {
        Some(ref parts) if !args.no_poll => {
            let poller = TelegramPoller::new(parts.client.clone(), app.service.clone(), parts.chat.clone());
            Some(tokio::spawn(poller.run(shutdown_rx.clone())))
        }
        _ => None,
    };

    tracing::info!(
        server = server_task.is_some(),
        telegram = app.telegram.is_some(),
        polling = poller_task.is_some(),
        "nudge service running; press Ctrl-C to stop"
    );

    let stop_reason = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            tracing::info!("shutdown requested");
            daemon_handle.stop();
            (&mut daemon_task).await.ok().flatten().unwrap_or(StopReason::Requested)
        }
        reason = &mut daemon_task => reason.ok().flatten().unwrap_or(StopReason::Requested),
    };

    let _ = shutdown_tx.send(true);
    for task in [server_task, poller_task].into_iter().flatten() {
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "background task ended abnormally");
        }
    }

    let status = daemon_handle.status().await;
    let output_data = RunOutput {
        stop_reason: match stop_reason {
            StopReason::Requested => "requested".to_string(),
            StopReason::TooManyFailures => "too many failed ticks".to_string(),
        },
        total_ticks: status.total_ticks,
        nudges_sent: status.nudges_sent,
        failed_ticks: status.failed_ticks,
    };
    output(&output_data, json_mode);

    if stop_reason == StopReason::TooManyFailures {
        anyhow::bail!("Nudge daemon stopped after repeated failures");
    }
    Ok(())
}

/// Log daemon events until it stops; returns why it stopped.
async fn watch_daemon(mut events: mpsc::Receiver<NudgeDaemonEvent>) -> Option<StopReason> {
    while let Some(event) = events.recv().await {
        match event {
            NudgeDaemonEvent::Started => tracing::debug!("daemon started"),
            NudgeDaemonEvent::TickCompleted { tick_number, outcome } => {
                tracing::debug!(tick_number, ?outcome, "tick completed");
            }
            NudgeDaemonEvent::DeliveryFailed { tick_number, error } => {
                tracing::warn!(tick_number, %error, "nudge could not be delivered");
            }
            NudgeDaemonEvent::TickFailed { tick_number, error } => {
                tracing::error!(tick_number, %error, "tick failed");
            }
            NudgeDaemonEvent::Stopped { reason } => return Some(reason),
        }
    }
    None
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

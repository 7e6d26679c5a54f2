//! Nudge background daemon.
//!
//! Drives `NudgeService::tick` on a fixed interval. The daemon itself holds
//! no engine state; everything it decides goes through the task store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify, RwLock};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::domain::errors::DomainError;
use crate::domain::models::{EngineConfig, TickOutcome};
use crate::services::nudge_service::NudgeService;

/// Configuration for the nudge daemon.
#[derive(Debug, Clone)]
pub struct NudgeDaemonConfig {
    /// Interval between ticks.
    pub tick_interval: Duration,
    /// Delay before the first tick.
    pub first_tick_delay: Duration,
    /// Consecutive failed ticks before stopping. Storage outages and
    /// delivery failures never count.
    pub max_consecutive_failures: u32,
}

impl Default for NudgeDaemonConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(60),
            first_tick_delay: Duration::from_secs(10),
            max_consecutive_failures: 5,
        }
    }
}

impl From<&EngineConfig> for NudgeDaemonConfig {
    fn from(engine: &EngineConfig) -> Self {
        Self {
            tick_interval: Duration::from_secs(engine.tick_interval_secs.max(1)),
            first_tick_delay: Duration::from_secs(engine.first_tick_delay_secs),
            max_consecutive_failures: engine.max_consecutive_failures.max(1),
        }
    }
}

/// Event emitted by the daemon.
#[derive(Debug, Clone)]
pub enum NudgeDaemonEvent {
    Started,
    TickCompleted { tick_number: u64, outcome: TickOutcome },
    /// The nudge was decided and recorded but could not be delivered.
    DeliveryFailed { tick_number: u64, error: String },
    TickFailed { tick_number: u64, error: String },
    Stopped { reason: StopReason },
}

/// Reason the daemon stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    Requested,
    TooManyFailures,
}

#[derive(Debug, Clone, Default)]
pub struct DaemonStatus {
    pub running: bool,
    pub total_ticks: u64,
    pub nudges_sent: u64,
    pub failed_ticks: u64,
    pub last_tick: Option<Instant>,
}

/// Handle to control a running daemon.
#[derive(Clone)]
pub struct DaemonHandle {
    stop_flag: Arc<AtomicBool>,
    wake: Arc<Notify>,
    status: Arc<RwLock<DaemonStatus>>,
}

impl DaemonHandle {
    /// Request the daemon to stop; it exits before its next tick.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Release);
        self.wake.notify_one();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_flag.load(Ordering::Acquire)
    }

    pub async fn status(&self) -> DaemonStatus {
        self.status.read().await.clone()
    }
}

pub struct NudgeDaemon {
    service: Arc<NudgeService>,
    config: NudgeDaemonConfig,
    status: Arc<RwLock<DaemonStatus>>,
    stop_flag: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl NudgeDaemon {
    pub fn new(service: Arc<NudgeService>, config: NudgeDaemonConfig) -> Self {
        Self {
            service,
            config,
            status: Arc::new(RwLock::new(DaemonStatus::default())),
            stop_flag: Arc::new(AtomicBool::new(false)),
            wake: Arc::new(Notify::new()),
        }
    }

    pub fn handle(&self) -> DaemonHandle {
        DaemonHandle {
            stop_flag: self.stop_flag.clone(),
            wake: self.wake.clone(),
            status: self.status.clone(),
        }
    }

    /// Spawn the daemon, returning a channel for its events.
    pub fn spawn(self) -> mpsc::Receiver<NudgeDaemonEvent> {
        let (tx, rx) = mpsc::channel(100);
        tokio::spawn(async move {
            self.run_loop(tx).await;
        });
        rx
    }

    /// Run the daemon on the current task until it stops.
    pub async fn run_with_sender(self, tx: mpsc::Sender<NudgeDaemonEvent>) -> StopReason {
        self.run_loop(tx).await
    }

    async fn run_loop(self, tx: mpsc::Sender<NudgeDaemonEvent>) -> StopReason {
        self.status.write().await.running = true;
        let _ = tx.send(NudgeDaemonEvent::Started).await;
        tracing::info!(
            interval_secs = self.config.tick_interval.as_secs(),
            first_tick_secs = self.config.first_tick_delay.as_secs(),
            "nudge daemon started"
        );

        let mut consecutive_failures = 0u32;
        let mut timer = interval_at(Instant::now() + self.config.first_tick_delay, self.config.tick_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let reason = loop {
            if self.stop_flag.load(Ordering::Acquire) {
                break StopReason::Requested;
            }

            tokio::select! {
                _ = timer.tick() => {}
                _ = self.wake.notified() => continue,
            }

            if self.stop_flag.load(Ordering::Acquire) {
                break StopReason::Requested;
            }

            self.run_tick(&tx, &mut consecutive_failures).await;

            if consecutive_failures >= self.config.max_consecutive_failures {
                tracing::error!(consecutive_failures, "nudge daemon stopping after repeated failures");
                break StopReason::TooManyFailures;
            }
        };

        self.status.write().await.running = false;
        tracing::info!(?reason, "nudge daemon stopped");
        let _ = tx.send(NudgeDaemonEvent::Stopped { reason: reason.clone() }).await;
        reason
    }

    async fn run_tick(&self, tx: &mpsc::Sender<NudgeDaemonEvent>, consecutive_failures: &mut u32) {
        let tick_number = {
            let mut status = self.status.write().await;
            status.total_ticks += 1;
            status.last_tick = Some(Instant::now());
            status.total_ticks
        };

        match self.service.tick().await {
            Ok(outcome) => {
                *consecutive_failures = 0;
                if matches!(outcome, TickOutcome::Nudged { .. }) {
                    self.status.write().await.nudges_sent += 1;
                }
                let _ = tx.send(NudgeDaemonEvent::TickCompleted { tick_number, outcome }).await;
            }
            // Delivery is best effort and already logged; the tick itself succeeded.
            Err(DomainError::NotificationFailed(error)) => {
                *consecutive_failures = 0;
                let _ = tx.send(NudgeDaemonEvent::DeliveryFailed { tick_number, error }).await;
            }
            // The store keeps serving from memory; keep ticking until the disk is back.
            Err(DomainError::PersistenceUnavailable(error)) => {
                *consecutive_failures = 0;
                self.status.write().await.failed_ticks += 1;
                tracing::warn!(tick_number, error = %error, "tick not persisted");
                let _ = tx.send(NudgeDaemonEvent::TickFailed { tick_number, error }).await;
            }
            Err(e) => {
                *consecutive_failures += 1;
                self.status.write().await.failed_ticks += 1;
                tracing::warn!(tick_number, error = %e, consecutive_failures = *consecutive_failures, "tick failed");
                let _ = tx
                    .send(NudgeDaemonEvent::TickFailed { tick_number, error: e.to_string() })
                    .await;
            }
        }
    }
}

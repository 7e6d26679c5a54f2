//! Task store.
//!
//! Owns the single `DailyState` and serializes every read → mutate → persist
//! sequence behind one async mutex. Operations work on a copy of the state
//! and only commit it in memory after the repository accepted it, so a
//! failed save never leaves a half-applied state behind.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::errors::DomainResult;
use crate::domain::models::DailyState;
use crate::domain::ports::{Clock, ClockReading, DailyStateRepository};
use crate::services::rollover::{elect, needs_rollover};

pub struct TaskStore {
    repo: Arc<dyn DailyStateRepository>,
    clock: Arc<dyn Clock>,
    capacity: usize,
    /// Last state known to be persisted (or loaded).
    current: Mutex<Option<DailyState>>,
}

impl TaskStore {
    pub fn new(repo: Arc<dyn DailyStateRepository>, clock: Arc<dyn Clock>, capacity: usize) -> Self {
        Self {
            repo,
            clock,
            capacity,
            current: Mutex::new(None),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn backend(&self) -> &'static str {
        self.repo.backend()
    }

    pub fn now(&self) -> ClockReading {
        self.clock.now()
    }

    /// Current state for reading, with the rollover applied if the day changed.
    ///
    /// A rollover is persisted on the way; if that save fails the rolled
    /// state is still returned and the next operation tries again.
    pub async fn snapshot(&self) -> (DailyState, ClockReading) {
        let mut current = self.current.lock().await;
        let now = self.clock.now();
        let (state, rolled) = self.resolve(current.as_ref(), &now).await;

        if rolled {
            match self.repo.save(&state).await {
                Ok(()) => *current = Some(state.clone()),
                Err(e) => tracing::warn!(error = %e, "failed to persist rollover"),
            }
        } else {
            *current = Some(state.clone());
        }

        (state, now)
    }

    /// Apply `f` to the current state and persist the result if it changed.
    ///
    /// Errors from `f` leave the state untouched (a pending rollover is still
    /// persisted). Errors from the repository are returned and the previous
    /// in-memory state stays authoritative.
    pub async fn mutate<F, R>(&self, f: F) -> DomainResult<R>
    where
        F: FnOnce(&mut DailyState, &ClockReading) -> DomainResult<R> + Send,
        R: Send,
    {
        let mut current = self.current.lock().await;
        let now = self.clock.now();
        let (resolved, rolled) = self.resolve(current.as_ref(), &now).await;

        let mut working = resolved.clone();
        let result = match f(&mut working, &now) {
            Ok(result) => result,
            Err(e) => {
                if rolled && self.repo.save(&resolved).await.is_ok() {
                    *current = Some(resolved);
                }
                return Err(e);
            }
        };

        if rolled || working != resolved {
            if let Err(e) = self.repo.save(&working).await {
                tracing::warn!(
                    backend = self.repo.backend(),
                    error = %e,
                    "failed to persist daily state; keeping previous state"
                );
                return Err(e);
            }
        }

        *current = Some(working);
        Ok(result)
    }

    /// Load the latest state and elect a new day if needed.
    ///
    /// Returns the state and whether a rollover happened.
    async fn resolve(&self, cached: Option<&DailyState>, now: &ClockReading) -> (DailyState, bool) {
        let loaded = match self.repo.load().await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(
                    backend = self.repo.backend(),
                    error = %e,
                    "failed to load daily state; using in-memory copy"
                );
                None
            }
        };

        let base = loaded
            .or_else(|| cached.cloned())
            .unwrap_or_else(|| DailyState::new(now.date));

        if needs_rollover(&base, now.date) {
            (elect(&base, now.date, self.capacity), true)
        } else {
            (base, false)
        }
    }
}

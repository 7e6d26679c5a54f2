//! In-memory daily state repository.
//!
//! Used in tests and as the fallback when no durable backend can be opened.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::errors::DomainResult;
use crate::domain::models::DailyState;
use crate::domain::ports::DailyStateRepository;

#[derive(Debug, Default)]
pub struct InMemoryDailyStateRepository {
    state: RwLock<Option<DailyState>>,
}

impl InMemoryDailyStateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: DailyState) -> Self {
        Self {
            state: RwLock::new(Some(state)),
        }
    }
}

#[async_trait]
impl DailyStateRepository for InMemoryDailyStateRepository {
    async fn load(&self) -> DomainResult<Option<DailyState>> {
        Ok(self.state.read().await.clone())
    }

    async fn save(&self, state: &DailyState) -> DomainResult<()> {
        *self.state.write().await = Some(state.clone());
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

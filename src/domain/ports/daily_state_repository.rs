//! Repository port for daily state persistence.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::DailyState;

/// Storage for the single daily state record.
///
/// `save` replaces the whole record (an upsert keyed by the subscriber
/// identity the adapter was built with); there are no partial updates.
#[async_trait]
pub trait DailyStateRepository: Send + Sync {
    /// Load the stored state, if any.
    ///
    /// Records in a legacy shape are upgraded before being returned.
    async fn load(&self) -> DomainResult<Option<DailyState>>;

    /// Replace the stored state.
    async fn save(&self, state: &DailyState) -> DomainResult<()>;

    /// Short backend name for logs and status output.
    fn backend(&self) -> &'static str;
}

//! Port for delivering nudges to the user.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::Nudge;

/// Outbound notification channel.
///
/// Delivery is best effort. Implementations build their own markup and a
/// "done" affordance keyed by `nudge.task_id`.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn emit_nudge(&self, nudge: &Nudge) -> DomainResult<()>;

    fn name(&self) -> &'static str;

    /// Whether a recipient is known. Ticks are skipped until it is.
    fn is_ready(&self) -> bool {
        true
    }
}

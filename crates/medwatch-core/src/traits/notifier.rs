// # Notifier Trait
//
// Defines the interface for delivering a change-set to a messaging
// channel.
//
// ## Implementations
//
// - Telegram: `medwatch-notify-telegram` crate
// - Recording mocks: contract tests within medwatch-core
//
// ## Failure contract
//
// Delivery failure is reportable, not fatal: the runner logs it and still
// persists the new snapshot. A change-set that fails to deliver is gone —
// the next run diffs against the updated baseline. Implementations should
// therefore do their own formatting defensively (escaping, length limits)
// rather than erroring on odd input.

use async_trait::async_trait;

use crate::model::ChangeSet;

/// Trait for notification channel implementations
///
/// Implementations must be thread-safe and usable across async tasks. They
/// deliver one message per change-set and must not retry; a single
/// best-effort attempt is the policy.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a change-set to the channel
    ///
    /// Called only for non-empty change-sets.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Delivered
    /// - `Err(Error)`: Delivery failed; surfaced to the operator, does not
    ///   block snapshot persistence
    async fn notify(&self, changes: &ChangeSet) -> Result<(), crate::Error>;

    /// Get the channel name (for logging/debugging)
    fn channel_name(&self) -> &'static str;
}

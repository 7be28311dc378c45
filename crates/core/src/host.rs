use async_trait::async_trait;

use crate::SettleError;

/// Callback handed to the host when a wait is ready to resolve.
pub type FlushTask = Box<dyn FnOnce() + Send + 'static>;

/// The capability surface a poller needs from the application under test.
///
/// Adapters implement this for a concrete framework or page. Probe errors do
/// not abort a wait by themselves; the poller counts them as busy ticks.
#[async_trait]
pub trait SettleHost: Send + Sync {
    /// A route transition is in flight.
    async fn is_transition_active(&self) -> Result<bool, SettleError>;

    /// Network requests started but not yet finished.
    async fn pending_request_count(&self) -> Result<usize, SettleError>;

    /// Timers are scheduled or a run-loop frame is open.
    async fn has_scheduled_work(&self) -> Result<bool, SettleError>;

    /// Run `task` through the host's own run-to-completion discipline.
    ///
    /// Dropping the task without calling it fails the pending wait.
    fn schedule_flush(&self, task: FlushTask);
}

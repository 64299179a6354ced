//! # Notifier contract.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::NotifyError;

/// Best-effort side effect run after a successful write, detached from the request.
///
/// Implementations may be slow, may fail and may even panic: the runner
/// contains all of it. Results never reach the request's caller.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Identifier produced by the store.
    type Id: Send + 'static;

    /// Publishes the notification for `id`.
    ///
    /// `ctx` belongs to the runner, not to the request: it is only cancelled
    /// by the per-task timeout or by [`TaskRunner::cancel_outstanding`](crate::TaskRunner::cancel_outstanding).
    async fn notify(&self, ctx: CancellationToken, id: Self::Id) -> Result<(), NotifyError>;
}

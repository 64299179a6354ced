//! # Task abstraction.
//!
//! A [`Task`] is an opaque unit of work submitted to the
//! [`TaskRunner`](crate::TaskRunner). It has a name for observability and no
//! other identity: once it finishes, the runtime forgets it.
//!
//! A task receives a [`CancellationToken`] owned by the runner (not by the
//! request that submitted it). Cooperative tasks may watch it to stop early
//! when the process owner gives up on a drain.

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Boxed future returned by [`Task::spawn`].
pub type BoxTaskFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'static>>;

/// # Asynchronous, detached unit of work.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use drainvisor::{BoxTaskFuture, Task};
///
/// struct Ping;
///
/// impl Task for Ping {
///     fn name(&self) -> &str { "ping" }
///
///     fn spawn(&self, _ctx: CancellationToken) -> BoxTaskFuture {
///         Box::pin(async { Ok(()) })
///     }
/// }
/// ```
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Creates the future that performs the work.
    ///
    /// The future is polled on its own tokio task; it may panic, and the panic
    /// is contained by the runner.
    fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture;
}

//! # Outstanding-work tracker.
//!
//! Counts detached tasks that are currently executing and exposes the moment
//! the count reaches zero as an awaitable signal.
//!
//! ```text
//! TaskRunner::submit ──► begin() ──► WorkGuard ──(moved into task)──► drop ──► end()
//!                                                                       │
//!                                                        count == 0 ────┴──► Notify::notify_waiters()
//!                                                                                 │
//! ShutdownCoordinator ──► DrainSignal::wait_until(deadline) ◄─────────────────────┘
//! ```
//!
//! ## Rules
//! - `end()` is private and only reachable through [`WorkGuard`]'s `Drop`, so
//!   every `begin()` is paired with exactly one `end()`, on every exit path
//!   (return, contained panic, timeout, or the task future being dropped).
//! - The counter is the only shared mutable state; updates are single atomic ops.
//! - Waiters register with the [`Notify`] *before* re-reading the counter, so
//!   a zero crossing between the read and the await cannot be missed.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use super::coordinator::ShutdownOutcome;

/// Counter of currently executing detached tasks.
#[derive(Default)]
pub struct OutstandingWork {
    count: AtomicUsize,
    zero: Notify,
}

impl OutstandingWork {
    /// Creates a tracker with nothing outstanding.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers one unit of work and returns the guard that releases it.
    pub fn begin(self: &Arc<Self>) -> WorkGuard {
        self.count.fetch_add(1, Ordering::AcqRel);
        WorkGuard {
            work: Arc::clone(self),
        }
    }

    fn end(&self) {
        let prev = self.count.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(prev > 0, "outstanding work released more times than registered");
        if prev == 1 {
            self.zero.notify_waiters();
        }
    }

    /// Current number of outstanding tasks.
    pub fn outstanding(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Completes once the count is zero. Returns immediately if it already is.
    pub async fn drained(&self) {
        loop {
            let notified = self.zero.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Waits until the count is zero or `ctx` is cancelled.
    ///
    /// If both are true at once, `Drained` wins.
    pub async fn wait(&self, ctx: &CancellationToken) -> ShutdownOutcome {
        self.wait_until(ctx.cancelled()).await
    }

    /// Waits until the count is zero or `deadline` completes.
    pub async fn wait_until<F>(&self, deadline: F) -> ShutdownOutcome
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = self.drained() => ShutdownOutcome::Drained,
            _ = deadline => ShutdownOutcome::TimedOut,
        }
    }

    /// Read-only view handed to the shutdown coordinator.
    pub fn signal(self: &Arc<Self>) -> DrainSignal {
        DrainSignal {
            work: Arc::clone(self),
        }
    }
}

impl fmt::Debug for OutstandingWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutstandingWork")
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

/// Releases one unit of outstanding work when dropped.
#[must_use = "dropping the guard immediately releases the work it tracks"]
pub struct WorkGuard {
    work: Arc<OutstandingWork>,
}

impl WorkGuard {
    /// Releases the work now. Equivalent to dropping the guard.
    pub fn release(self) {
        drop(self);
    }

    /// Count observed through this guard (includes the guard's own unit).
    pub fn outstanding(&self) -> usize {
        self.work.outstanding()
    }
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        self.work.end();
    }
}

impl fmt::Debug for WorkGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkGuard").finish_non_exhaustive()
    }
}

/// Read-only handle on an [`OutstandingWork`]: can observe, cannot register or release.
#[derive(Clone, Debug)]
pub struct DrainSignal {
    work: Arc<OutstandingWork>,
}

impl DrainSignal {
    /// Current number of outstanding tasks.
    pub fn outstanding(&self) -> usize {
        self.work.outstanding()
    }

    /// See [`OutstandingWork::drained`].
    pub async fn drained(&self) {
        self.work.drained().await
    }

    /// See [`OutstandingWork::wait_until`].
    pub async fn wait_until<F>(&self, deadline: F) -> ShutdownOutcome
    where
        F: Future<Output = ()>,
    {
        self.work.wait_until(deadline).await
    }
}

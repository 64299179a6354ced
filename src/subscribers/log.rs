//! # LogWriter: renders runtime events through `tracing`
//!
//! Routine lifecycle events go to `debug`/`info`, drain timeouts and dropped
//! events to `warn`, subscriber panics to `error`. Task failures and panics are
//! already logged by the runner at `warn`/`error`, so here they stay at `debug`.
//! Install any `tracing` subscriber to see the output.
//!
//! ## Example output (fmt layer)
//! ```text
//! INFO  drainvisor: task submitted task="notify:1" outstanding=1
//! WARN  drainvisor: task failed task="notify:1" reason="execution failed: publish failed: broker down"
//! INFO  drainvisor: drain requested outstanding=1
//! WARN  drainvisor: drain timed out, proceeding with tasks still running outstanding=1
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::TaskSubmitted => {
                debug!(target: "drainvisor", seq = e.seq, task, outstanding = ?e.outstanding, "task submitted");
            }
            EventKind::TaskCompleted => {
                debug!(target: "drainvisor", seq = e.seq, task, "task completed");
            }
            EventKind::TaskFailed => {
                debug!(target: "drainvisor", seq = e.seq, task, reason, "task failed");
            }
            EventKind::TaskPanicked => {
                debug!(target: "drainvisor", seq = e.seq, task, reason, "task panicked");
            }
            EventKind::TimeoutHit => {
                warn!(target: "drainvisor", seq = e.seq, task, timeout_ms = ?e.timeout_ms, "task timed out");
            }
            EventKind::WriteFailed => {
                warn!(target: "drainvisor", seq = e.seq, reason, "durable write failed");
            }
            EventKind::DrainRequested => {
                info!(target: "drainvisor", seq = e.seq, outstanding = ?e.outstanding, "drain requested");
            }
            EventKind::Drained => {
                info!(target: "drainvisor", seq = e.seq, "all tasks finished");
            }
            EventKind::DrainTimedOut => {
                warn!(
                    target: "drainvisor",
                    seq = e.seq,
                    outstanding = ?e.outstanding,
                    "drain timed out, proceeding with tasks still running"
                );
            }
            EventKind::SubscriberOverflow => {
                warn!(target: "drainvisor", subscriber = task, reason, "subscriber dropped event");
            }
            EventKind::SubscriberPanicked => {
                error!(target: "drainvisor", subscriber = task, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

//! # Runtime events emitted by the runner, coordinator and orchestrator.
//!
//! [`EventKind`] groups events into:
//! - **Task events**: detached task lifecycle (submitted, completed, failed, panicked, timeout)
//! - **Request events**: failures of the synchronous write step
//! - **Drain events**: shutdown coordination (requested, drained, timed out)
//! - **Subscriber events**: delivery problems inside the fan-out itself
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Tasks are independent, so `seq` is the only cross-task ordering available.
//!
//! ## Example
//! ```rust
//! use drainvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_task("notify:42")
//!     .with_reason("broker down")
//!     .with_outstanding(3);
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("notify:42"));
//! assert_eq!(ev.outstanding, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Task events ===
    /// Task registered with the tracker and spawned.
    ///
    /// Sets `task`, `outstanding` (count after registration).
    TaskSubmitted,

    /// Task body returned `Ok(())`.
    ///
    /// Sets `task`, `outstanding` (count before release).
    TaskCompleted,

    /// Task body returned an error (including cancellation and timeout).
    ///
    /// Sets `task`, `reason`, `outstanding`.
    TaskFailed,

    /// Task body panicked; the panic was contained.
    ///
    /// Sets `task`, `reason` (panic payload), `outstanding`.
    TaskPanicked,

    /// Task exceeded the configured per-task timeout (always followed by `TaskFailed`).
    ///
    /// Sets `task`, `timeout_ms`.
    TimeoutHit,

    // === Request events ===
    /// The durable write failed; the request fails and nothing is submitted.
    ///
    /// Sets `reason`.
    WriteFailed,

    // === Drain events ===
    /// Drain started.
    ///
    /// Sets `outstanding` (count observed when the drain began).
    DrainRequested,

    /// Outstanding work reached zero before the deadline.
    Drained,

    /// Deadline or cancellation fired first.
    ///
    /// Sets `outstanding` (count still running when the drain gave up).
    DrainTimedOut,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets `task` (subscriber name), `reason` (panic info).
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets `task` (subscriber name), `reason`.
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task (or subscriber), if applicable.
    pub task: Option<Arc<str>>,
    /// Human-readable reason (errors, panic payloads, overflow details).
    pub reason: Option<Arc<str>>,
    /// Outstanding task count at the time the event was produced.
    pub outstanding: Option<usize>,
    /// Task timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            reason: None,
            outstanding: None,
            timeout_ms: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches the outstanding task count.
    #[inline]
    pub fn with_outstanding(mut self, n: usize) -> Self {
        self.outstanding = Some(n);
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    /// True for task-terminal events (exactly one per submitted task).
    #[inline]
    pub fn is_task_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::TaskCompleted | EventKind::TaskFailed | EventKind::TaskPanicked
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_monotonic() {
        let a = Event::new(EventKind::Drained);
        let b = Event::new(EventKind::Drained);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn timeout_is_clamped_to_u32_millis() {
        let ev = Event::new(EventKind::TimeoutHit).with_timeout(Duration::from_secs(u64::MAX));
        assert_eq!(ev.timeout_ms, Some(u32::MAX));
    }
}

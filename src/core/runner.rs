//! # Detached task runner with fault containment.
//!
//! [`TaskRunner::submit`] registers a task with the tracker and spawns it on
//! its own tokio task; the caller never waits and never observes the result.
//!
//! ## Execution flow
//! ```text
//! submit(task)
//!   ├─► guard = OutstandingWork::begin()
//!   ├─► publish TaskSubmitted
//!   └─► tokio::spawn ──► run_contained(task)
//!                          ├─ task.spawn(ctx)        (closure panic caught)
//!                          ├─ fut.catch_unwind()     (body panic caught)
//!                          └─ timeout (optional)     (ctx cancelled, TimeoutHit)
//!                        ──► publish one terminal event (failures also logged)
//!                              Ok            → TaskCompleted
//!                              Err(Panicked) → TaskPanicked
//!                              Err(_)        → TaskFailed
//!                        ──► drop(guard)      (End, exactly once)
//! ```
//!
//! ## Rules
//! - Exactly one terminal event per submitted task.
//! - The guard lives inside the spawned future: if the runtime drops the
//!   future (runtime shutdown), the guard is still released.
//! - No retries.
//! - Tasks get a child of the runner's token, never the submitter's.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::time;
use tokio_util::sync::CancellationToken;

use super::tracker::OutstandingWork;
use crate::{
    error::{TaskError, panic_info},
    events::{Bus, Event, EventKind},
    tasks::{Task, TaskRef},
};

/// Spawns detached tasks and keeps the outstanding-work count honest.
///
/// Cheap to clone; clones share the tracker, the bus and the task token.
#[derive(Clone, Debug)]
pub struct TaskRunner {
    work: Arc<OutstandingWork>,
    bus: Bus,
    token: CancellationToken,
    timeout: Option<Duration>,
}

impl TaskRunner {
    /// Creates a runner that registers tasks with `work` and reports on `bus`.
    pub fn new(work: Arc<OutstandingWork>, bus: Bus, timeout: Option<Duration>) -> Self {
        Self {
            work,
            bus,
            token: CancellationToken::new(),
            timeout,
        }
    }

    /// Schedules `task` independently of the caller and returns immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, task: TaskRef) {
        let guard = self.work.begin();
        self.bus.publish(
            Event::new(EventKind::TaskSubmitted)
                .with_task(task.name())
                .with_outstanding(guard.outstanding()),
        );

        let ctx = self.token.child_token();
        let bus = self.bus.clone();
        let timeout = self.timeout;

        tokio::spawn(async move {
            let res = run_contained(task.as_ref(), ctx, timeout, &bus).await;
            publish_terminal(&bus, task.name(), &res, guard.outstanding());
            guard.release();
        });
    }

    /// Cancels the token handed to every task, past and future.
    ///
    /// Cooperative tasks can use this to stop early once a drain has timed
    /// out. Tasks that ignore their token keep running.
    pub fn cancel_outstanding(&self) {
        self.token.cancel();
    }

    /// Current number of outstanding tasks.
    pub fn outstanding(&self) -> usize {
        self.work.outstanding()
    }
}

/// Runs one task to completion, converting every fault into a `TaskError`.
async fn run_contained(
    task: &dyn Task,
    ctx: CancellationToken,
    timeout: Option<Duration>,
    bus: &Bus,
) -> Result<(), TaskError> {
    let fut = match std::panic::catch_unwind(AssertUnwindSafe(|| task.spawn(ctx.clone()))) {
        Ok(fut) => fut,
        Err(payload) => {
            return Err(TaskError::Panicked {
                info: panic_info(&*payload),
            });
        }
    };

    let contained = AssertUnwindSafe(fut).catch_unwind().map(|res| {
        res.unwrap_or_else(|payload| {
            Err(TaskError::Panicked {
                info: panic_info(&*payload),
            })
        })
    });

    match timeout {
        Some(dur) => match time::timeout(dur, contained).await {
            Ok(res) => res,
            Err(_elapsed) => {
                ctx.cancel();
                bus.publish(
                    Event::new(EventKind::TimeoutHit)
                        .with_task(task.name())
                        .with_timeout(dur),
                );
                Err(TaskError::Timeout { timeout: dur })
            }
        },
        None => contained.await,
    }
}

/// Publishes the single terminal event for a finished task.
///
/// Failures are also logged here: the bus drops events nobody listens to.
fn publish_terminal(bus: &Bus, name: &str, res: &Result<(), TaskError>, outstanding: usize) {
    let ev = match res {
        Ok(()) => Event::new(EventKind::TaskCompleted),
        Err(e @ TaskError::Panicked { .. }) => {
            let reason = e.as_message();
            tracing::error!(target: "drainvisor", task = name, reason = %reason, "task panicked");
            Event::new(EventKind::TaskPanicked).with_reason(reason)
        }
        Err(e) => {
            let reason = e.to_string();
            tracing::warn!(target: "drainvisor", task = name, reason = %reason, "task failed");
            Event::new(EventKind::TaskFailed).with_reason(reason)
        }
    };
    bus.publish(ev.with_task(name).with_outstanding(outstanding));
}

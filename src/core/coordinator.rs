//! # Shutdown coordinator: bounded wait for outstanding work.
//!
//! ```text
//!            drain(ctx)
//!   Idle ───────────────► Waiting ──┬── DrainSignal fires ──► Done(Drained)
//!                                   └── ctx / deadline ─────► Done(TimedOut)
//! ```
//!
//! ## Rules
//! - Single attempt; the ceiling comes from the caller's context, nothing is retried.
//! - Never blocks past the deadline and never panics.
//! - Reads the [`DrainSignal`] only; it cannot register or release work.
//! - `Done` is terminal: later calls return the recorded outcome at once.
//! - A drain whose future is dropped while `Waiting` returns the state to `Idle`.
//! - A second concurrent call while `Waiting` races its own context without
//!   recording an outcome or publishing events.
//!
//! `TimedOut` is an expected outcome, not an error; the caller decides whether
//! to warn or to cancel the tasks still running.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::{shutdown, tracker::DrainSignal};
use crate::events::{Bus, Event, EventKind};

/// Result of one shutdown drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Outstanding work reached zero before the deadline.
    Drained,
    /// The deadline or cancellation fired first; some tasks were still running.
    TimedOut,
}

impl ShutdownOutcome {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ShutdownOutcome::Drained => "drained",
            ShutdownOutcome::TimedOut => "timed_out",
        }
    }
}

/// Coordinator state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainState {
    /// No drain requested yet.
    Idle,
    /// A drain is waiting on the signal.
    Waiting,
    /// Terminal.
    Done(ShutdownOutcome),
}

enum Entry {
    First,
    Concurrent,
    Finished(ShutdownOutcome),
}

/// Races "all outstanding tasks finished" against a caller-supplied deadline.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    signal: DrainSignal,
    bus: Bus,
    state: Mutex<DrainState>,
}

impl ShutdownCoordinator {
    /// Creates an idle coordinator observing `signal`.
    pub fn new(signal: DrainSignal, bus: Bus) -> Self {
        Self {
            signal,
            bus,
            state: Mutex::new(DrainState::Idle),
        }
    }

    /// Current state.
    pub fn state(&self) -> DrainState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits for outstanding tasks to finish, or for `ctx` to be cancelled.
    pub async fn drain(&self, ctx: &CancellationToken) -> ShutdownOutcome {
        self.drain_until(ctx.cancelled()).await
    }

    /// Waits for outstanding tasks to finish, for at most `grace`.
    pub async fn drain_within(&self, grace: Duration) -> ShutdownOutcome {
        self.drain_until(tokio::time::sleep(grace)).await
    }

    /// Waits for a termination signal, then drains within `grace`.
    ///
    /// Returns `Err` only if signal registration fails.
    pub async fn drain_on_signal(&self, grace: Duration) -> std::io::Result<ShutdownOutcome> {
        shutdown::wait_for_shutdown_signal().await?;
        Ok(self.drain_within(grace).await)
    }

    async fn drain_until<F>(&self, deadline: F) -> ShutdownOutcome
    where
        F: Future<Output = ()>,
    {
        match self.enter() {
            Entry::Finished(outcome) => return outcome,
            Entry::Concurrent => return self.signal.wait_until(deadline).await,
            Entry::First => {}
        }

        let waiting = WaitingGuard {
            coord: self,
            armed: true,
        };
        self.bus.publish(
            Event::new(EventKind::DrainRequested).with_outstanding(self.signal.outstanding()),
        );

        let outcome = self.signal.wait_until(deadline).await;
        waiting.finish(outcome);

        match outcome {
            ShutdownOutcome::Drained => self.bus.publish(Event::new(EventKind::Drained)),
            ShutdownOutcome::TimedOut => self.bus.publish(
                Event::new(EventKind::DrainTimedOut).with_outstanding(self.signal.outstanding()),
            ),
        }
        outcome
    }

    fn enter(&self) -> Entry {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match *state {
            DrainState::Idle => {
                *state = DrainState::Waiting;
                Entry::First
            }
            DrainState::Waiting => Entry::Concurrent,
            DrainState::Done(outcome) => Entry::Finished(outcome),
        }
    }

    fn set_state(&self, next: DrainState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

/// Returns the coordinator to `Idle` if the waiting drain is dropped unfinished.
struct WaitingGuard<'a> {
    coord: &'a ShutdownCoordinator,
    armed: bool,
}

impl WaitingGuard<'_> {
    fn finish(mut self, outcome: ShutdownOutcome) {
        self.armed = false;
        self.coord.set_state(DrainState::Done(outcome));
    }
}

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.coord.set_state(DrainState::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tracker::OutstandingWork;
    use tokio::time;

    fn coordinator() -> (ShutdownCoordinator, std::sync::Arc<OutstandingWork>, Bus) {
        let work = OutstandingWork::new();
        let bus = Bus::new(16);
        (ShutdownCoordinator::new(work.signal(), bus.clone()), work, bus)
    }

    #[tokio::test]
    async fn idle_tracker_drains_immediately() {
        let (coord, _work, _bus) = coordinator();
        assert_eq!(coord.state(), DrainState::Idle);

        let ctx = CancellationToken::new();
        assert_eq!(coord.drain(&ctx).await, ShutdownOutcome::Drained);
        assert_eq!(coord.state(), DrainState::Done(ShutdownOutcome::Drained));
    }

    #[tokio::test(start_paused = true)]
    async fn done_is_terminal() {
        let (coord, work, bus) = coordinator();
        let guard = work.begin();

        assert_eq!(
            coord.drain_within(Duration::from_secs(1)).await,
            ShutdownOutcome::TimedOut
        );

        guard.release();
        let mut rx = bus.subscribe();
        assert_eq!(
            coord.drain_within(Duration::from_secs(1)).await,
            ShutdownOutcome::TimedOut
        );
        assert!(rx.try_recv().is_err(), "re-entry must not publish");
    }

    #[tokio::test(start_paused = true)]
    async fn publishes_requested_then_timed_out() {
        let (coord, work, bus) = coordinator();
        let mut rx = bus.subscribe();
        let _a = work.begin();
        let _b = work.begin();

        let outcome = coord.drain_within(Duration::from_millis(100)).await;
        assert_eq!(outcome, ShutdownOutcome::TimedOut);

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::DrainRequested);
        assert_eq!(ev.outstanding, Some(2));
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::DrainTimedOut);
        assert_eq!(ev.outstanding, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_drain_races_own_deadline_without_recording() {
        let (coord, work, bus) = coordinator();
        let mut rx = bus.subscribe();
        let guard = work.begin();
        let coord = &coord;

        let first = coord.drain_within(Duration::from_secs(10));
        let second = async move {
            let outcome = coord.drain_within(Duration::from_secs(1)).await;
            assert_eq!(coord.state(), DrainState::Waiting);

            time::sleep(Duration::from_secs(1)).await;
            assert_eq!(coord.state(), DrainState::Waiting);
            guard.release();
            outcome
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(second, ShutdownOutcome::TimedOut);
        assert_eq!(first, ShutdownOutcome::Drained);
        assert_eq!(coord.state(), DrainState::Done(ShutdownOutcome::Drained));

        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|ev| ev.kind)
            .collect();
        assert_eq!(kinds, vec![EventKind::DrainRequested, EventKind::Drained]);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_drain_returns_to_idle() {
        let (coord, work, _bus) = coordinator();
        let _guard = work.begin();

        let never = CancellationToken::new();
        let res = time::timeout(Duration::from_secs(1), coord.drain(&never)).await;
        assert!(res.is_err());
        assert_eq!(coord.state(), DrainState::Idle);
    }
}

//! # drainvisor
//!
//! **Drainvisor** is the core of a request-handling service that performs a
//! durable write, fires a best-effort notification detached from the request,
//! and shuts down without losing track of (or waiting forever on) the
//! notifications still in flight.
//!
//! ## Architecture
//! ```text
//!  transport (HTTP / RPC / CLI)
//!        │ execute(ctx, record)
//!        ▼
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ Orchestrator                                                     │
//! │  1. DurableStore::write(ctx, record)  ── Err ─► ServiceError     │
//! │  2. TaskRunner::submit(notify:{id})   ── returns immediately     │
//! │  3. Ok(id)                                                       │
//! └──────┬───────────────────────────────────────────────┬───────────┘
//!        │ owns                                          │ owns
//!        ▼                                               ▼
//! ┌──────────────┐  begin()/WorkGuard  ┌──────────────────┐
//! │  TaskRunner  │────────────────────►│ OutstandingWork  │
//! │ tokio::spawn │                     │ AtomicUsize +    │
//! │ catch_unwind │                     │ Notify (zero)    │
//! └──────┬───────┘                     └────────┬─────────┘
//!        │ Notifier::notify(ctx, id)            │ DrainSignal (read-only)
//!        ▼                                      ▼
//!   detached task                     ┌────────────────────┐
//!   (panic/err contained,             │ ShutdownCoordinator│◄── drain(ctx) / signal
//!    guard always released)           │ Drained | TimedOut │
//!                                     └────────────────────┘
//!
//! Runner, coordinator and orchestrator publish Events ──► Bus ──► SubscriberSet ──► LogWriter, ...
//! ```
//!
//! ## Features
//! | Area              | Description                                                     | Key types / traits                          |
//! |-------------------|-----------------------------------------------------------------|---------------------------------------------|
//! | **Service**       | Write, then detached notify; only write errors reach callers.   | [`Orchestrator`], [`DurableStore`], [`Notifier`] |
//! | **Execution**     | Detached tasks with panic containment and optional timeout.     | [`TaskRunner`], [`Task`], [`TaskFn`]        |
//! | **Tracking**      | Outstanding-work counter with RAII release and zero signal.     | [`OutstandingWork`], [`WorkGuard`]          |
//! | **Shutdown**      | Bounded drain racing completion against a deadline.             | [`ShutdownCoordinator`], [`ShutdownOutcome`] |
//! | **Observability** | Event bus with isolated subscribers.                            | [`Event`], [`Subscribe`], [`SubscriberSet`] |
//! | **Errors**        | Typed errors with stable labels.                                | [`ServiceError`], [`StoreError`], [`TaskError`] |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], a subscriber that renders events through `tracing`.
//!   Task faults and shutdown signals are logged through `tracing` regardless.

mod core;
mod error;
mod events;
mod service;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use crate::core::{
    Config, DrainSignal, DrainState, OutstandingWork, ShutdownCoordinator, ShutdownOutcome,
    ShutdownSignal, TaskRunner, WorkGuard, wait_for_shutdown_signal,
};
pub use error::{NotifyError, ServiceError, StoreError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use service::{DurableStore, Notifier, Orchestrator, OrchestratorBuilder};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{BoxTaskFuture, Task, TaskFn, TaskRef};

#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

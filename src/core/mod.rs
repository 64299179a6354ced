//! Runtime core: detached execution and shutdown coordination.
//!
//! - [`tracker`]: outstanding-work counter, RAII release guard, drain signal;
//! - [`runner`]: spawns detached tasks with panic containment and optional timeout;
//! - [`coordinator`]: bounded drain with `Drained` / `TimedOut` outcome;
//! - [`shutdown`]: cross-platform termination signal trigger;
//! - [`config`]: runtime settings.
//!
//! ```text
//! Orchestrator ──owns──► TaskRunner ──► OutstandingWork ◄──reads── DrainSignal ◄── ShutdownCoordinator
//! ```

mod config;
mod coordinator;
mod runner;
mod shutdown;
mod tracker;

pub use config::Config;
pub use coordinator::{DrainState, ShutdownCoordinator, ShutdownOutcome};
pub use runner::TaskRunner;
pub use shutdown::{ShutdownSignal, wait_for_shutdown_signal};
pub use tracker::{DrainSignal, OutstandingWork, WorkGuard};

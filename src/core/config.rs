//! # Runtime configuration.
//!
//! [`Config`] centralizes the settings of an [`Orchestrator`](crate::Orchestrator)
//! and the runner/coordinator it owns.
//!
//! ## Sentinel values
//! - `task_timeout = 0s` → no per-task timeout
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

/// Configuration for the service core.
///
/// ## Field semantics
/// - `grace`: drain budget used by [`Orchestrator::shutdown_on_signal`](crate::Orchestrator::shutdown_on_signal)
///   and [`Orchestrator::stop_within_grace`](crate::Orchestrator::stop_within_grace)
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `task_timeout`: ceiling for a single detached task (`0s` = none)
///
/// All fields are public; prefer the accessors over sentinel checks.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time a signal-triggered drain waits for outstanding tasks.
    ///
    /// When it elapses the drain reports `ShutdownOutcome::TimedOut` and the
    /// process proceeds; tasks are not force-killed by the coordinator.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel.
    ///
    /// Receivers lagging by more than `bus_capacity` events skip the oldest ones.
    pub bus_capacity: usize,

    /// Per-task timeout.
    ///
    /// - `Duration::ZERO` = no timeout (a task runs until it returns)
    /// - `> 0` = the task's token is cancelled and its future dropped on expiry;
    ///   the outstanding-work guard is still released.
    pub task_timeout: Duration,
}

impl Config {
    /// Returns the per-task timeout as an `Option`.
    #[inline]
    pub fn task_timeout(&self) -> Option<Duration> {
        if self.task_timeout == Duration::ZERO {
            None
        } else {
            Some(self.task_timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `grace = 30s`
    /// - `bus_capacity = 1024`
    /// - `task_timeout = 0s` (no timeout)
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(30),
            bus_capacity: 1024,
            task_timeout: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sentinels() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.task_timeout(), None);
        assert_eq!(cfg.bus_capacity_clamped(), 1);

        let cfg = Config {
            task_timeout: Duration::from_millis(250),
            ..Config::default()
        };
        assert_eq!(cfg.task_timeout(), Some(Duration::from_millis(250)));
    }
}

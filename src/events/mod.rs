//! Runtime events: types and broadcast bus.
//!
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! Publishers: `TaskRunner`, `ShutdownCoordinator`, `Orchestrator`, and
//! `SubscriberSet` workers (overflow/panic). Consumer: the orchestrator's
//! listener, which fans out to the `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

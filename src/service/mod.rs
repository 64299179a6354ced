//! # Request-facing service layer.
//!
//! - [`DurableStore`] - synchronous write collaborator
//! - [`Notifier`] - detached notification collaborator
//! - [`Orchestrator`] - write, then submit the notification, then return

mod notifier;
mod orchestrator;
mod store;

pub use notifier::Notifier;
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use store::DurableStore;

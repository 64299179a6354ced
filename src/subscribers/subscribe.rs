//! # Event subscriber trait.
//!
//! [`Subscribe`] is the extension point for plugging observers (logging,
//! metrics, alerting) into the runtime. Each subscriber gets a dedicated worker
//! and a bounded queue inside [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use drainvisor::{Event, EventKind, Subscribe};
//!
//! struct LostNotifications;
//!
//! #[async_trait]
//! impl Subscribe for LostNotifications {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::TaskFailed | EventKind::TaskPanicked) {
//!             // page someone, bump a counter, ...
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "lost-notifications" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated worker task, never from the publisher.
/// Panics are caught and reported as `EventKind::SubscriberPanicked`.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles a single event.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs and overflow/panic events).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    ///
    /// On overflow, events for this subscriber are **dropped**.
    fn queue_capacity(&self) -> usize {
        1024
    }
}

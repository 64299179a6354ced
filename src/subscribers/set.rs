//! # Non-blocking event fan-out to multiple subscribers.
//!
//! ```text
//! emit(event)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     │    (bounded)         └──────► panic → SubscriberPanicked
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//!          (bounded)
//! ```
//!
//! ## Rules
//! - `emit()` returns immediately (uses `try_send`)
//! - Overflow drops the event for that subscriber only and publishes `SubscriberOverflow`
//! - Per-subscriber FIFO; no ordering across subscribers
//! - A panicking subscriber is reported and keeps receiving later events

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::error::panic_info;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out over per-subscriber queues and worker tasks.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
            let worker_bus = bus.clone();

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(payload) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        worker_bus.publish(Event::subscriber_panicked(sub.name(), panic_info(&*payload)));
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }
        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Emits a pre-allocated event to all subscribers.
    ///
    /// Overflow events are never re-published when they themselves overflow.
    pub fn emit_arc(&self, event: Arc<Event>) {
        let is_overflow_evt = matches!(event.kind, EventKind::SubscriberOverflow);

        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !is_overflow_evt {
                self.bus.publish(Event::subscriber_overflow(channel.name, reason));
            }
        }
    }

    /// Emits an event to all subscribers (clones the event).
    pub fn emit(&self, event: &Event) {
        self.emit_arc(Arc::new(event.clone()));
    }

    /// Closes all queues and waits for workers to process what is already queued.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recorder(Arc<Mutex<Vec<EventKind>>>);

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.0.lock().unwrap().push(ev.kind);
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Exploder;

    #[async_trait]
    impl Subscribe for Exploder {
        async fn on_event(&self, _ev: &Event) {
            panic!("subscriber exploded");
        }
        fn name(&self) -> &'static str {
            "exploder"
        }
    }

    /// Accepts one queued event and never finishes handling it.
    struct Stuck;

    #[async_trait]
    impl Subscribe for Stuck {
        async fn on_event(&self, _ev: &Event) {
            std::future::pending::<()>().await;
        }
        fn name(&self) -> &'static str {
            "stuck"
        }
        fn queue_capacity(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn full_queue_reports_overflow_for_that_subscriber_only() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let set = SubscriberSet::new(
            vec![Arc::new(Stuck), Arc::new(Recorder(seen.clone()))],
            bus.clone(),
        );
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());

        // no await between emits: the stuck worker cannot drain its queue
        set.emit(&Event::new(EventKind::TaskSubmitted));
        set.emit(&Event::new(EventKind::TaskCompleted));
        set.emit(&Event::new(EventKind::Drained));
        set.emit(&Event::subscriber_overflow("elsewhere", "full"));

        let overflows: Vec<Event> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(overflows.len(), 2);
        for ev in &overflows {
            assert_eq!(ev.kind, EventKind::SubscriberOverflow);
            assert_eq!(ev.task.as_deref(), Some("stuck"));
            assert_eq!(ev.reason.as_deref(), Some("subscriber=stuck reason=full"));
        }

        for _ in 0..16 {
            if seen.lock().unwrap().len() == 4 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                EventKind::TaskSubmitted,
                EventKind::TaskCompleted,
                EventKind::Drained,
                EventKind::SubscriberOverflow,
            ]
        );
    }

    #[tokio::test]
    async fn empty_set_accepts_events() {
        let set = SubscriberSet::new(Vec::new(), Bus::new(4));
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        set.emit(&Event::new(EventKind::Drained));
        set.shutdown().await;
    }

    #[tokio::test]
    async fn delivers_in_fifo_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let set = SubscriberSet::new(vec![Arc::new(Recorder(seen.clone()))], Bus::new(16));

        set.emit(&Event::new(EventKind::DrainRequested));
        set.emit(&Event::new(EventKind::Drained));
        set.shutdown().await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![EventKind::DrainRequested, EventKind::Drained]
        );
    }

    #[tokio::test]
    async fn subscriber_panic_is_reported_on_bus() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Exploder)], bus.clone());

        set.emit(&Event::new(EventKind::Drained));
        set.shutdown().await;

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.task.as_deref(), Some("exploder"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber exploded"));
    }
}

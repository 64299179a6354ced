//! # Request orchestrator: durable write, then detached notification.
//!
//! ```text
//! execute(ctx, record)
//!   ├─► store.write(ctx, record) ──Err──► publish WriteFailed, return ServiceError::Write
//!   │        │
//!   │        Ok(id)
//!   │        ▼
//!   ├─► runner.submit(notify:{id})        (registers with tracker, returns at once)
//!   └─► return Ok(id)                     (never waits for the notifier)
//!
//! stop(ctx) ──► ShutdownCoordinator::drain(ctx) ──► Drained | TimedOut
//! ```
//!
//! The orchestrator is an explicit instance: build it once at process start and
//! hand the `Arc` to whatever transport sits above it.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use drainvisor::{Config, DurableStore, Notifier, NotifyError, Orchestrator, ShutdownOutcome, StoreError};
//!
//! struct Users;
//! struct Broker;
//!
//! #[async_trait]
//! impl DurableStore for Users {
//!     type Record = String;
//!     type Id = u64;
//!     async fn write(&self, _ctx: &CancellationToken, _name: String) -> Result<u64, StoreError> {
//!         Ok(1)
//!     }
//! }
//!
//! #[async_trait]
//! impl Notifier for Broker {
//!     type Id = u64;
//!     async fn notify(&self, _ctx: CancellationToken, _id: u64) -> Result<(), NotifyError> {
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let svc = Orchestrator::builder(Config::default(), Users, Broker).build();
//!
//!     let req = CancellationToken::new();
//!     let id = svc.execute(&req, "some name".to_string()).await.unwrap();
//!     assert_eq!(id, 1);
//!
//!     let outcome = svc.stop(&CancellationToken::new()).await;
//!     assert_eq!(outcome, ShutdownOutcome::Drained);
//! }
//! ```

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{Config, DrainState, OutstandingWork, ShutdownCoordinator, ShutdownOutcome, TaskRunner},
    error::{ServiceError, TaskError},
    events::{Bus, Event, EventKind},
    service::{DurableStore, Notifier},
    subscribers::{Subscribe, SubscriberSet},
    tasks::{TaskFn, TaskRef},
};

/// Sequences a durable write and a detached notification; owns the shutdown path.
pub struct Orchestrator<S, N>
where
    S: DurableStore,
    N: Notifier<Id = S::Id>,
{
    cfg: Config,
    store: S,
    notifier: Arc<N>,
    bus: Bus,
    runner: TaskRunner,
    coordinator: ShutdownCoordinator,
    listener: CancellationToken,
}

impl<S, N> Orchestrator<S, N>
where
    S: DurableStore,
    N: Notifier<Id = S::Id>,
{
    /// Returns a builder for the given configuration and collaborators.
    pub fn builder(cfg: Config, store: S, notifier: N) -> OrchestratorBuilder<S, N> {
        OrchestratorBuilder::new(cfg, store, notifier)
    }

    /// Handles one request.
    ///
    /// Returns as soon as the write succeeds; the notification runs detached.
    /// Only a write failure is reported, wrapped in [`ServiceError::Write`].
    pub async fn execute(
        &self,
        ctx: &CancellationToken,
        record: S::Record,
    ) -> Result<S::Id, ServiceError> {
        let id = match self.store.write(ctx, record).await {
            Ok(id) => id,
            Err(e) => {
                self.bus
                    .publish(Event::new(EventKind::WriteFailed).with_reason(e.to_string()));
                return Err(ServiceError::Write(e));
            }
        };

        self.runner.submit(self.notify_task(id.clone()));
        Ok(id)
    }

    /// Builds the detached notification task for `id`.
    fn notify_task(&self, id: S::Id) -> TaskRef {
        let notifier = Arc::clone(&self.notifier);
        TaskFn::arc(format!("notify:{id}"), move |ctx: CancellationToken| {
            let notifier = Arc::clone(&notifier);
            let id = id.clone();
            async move { notifier.notify(ctx, id).await.map_err(TaskError::from) }
        })
    }

    /// Drains outstanding notifications until done or until `ctx` is cancelled.
    pub async fn stop(&self, ctx: &CancellationToken) -> ShutdownOutcome {
        self.coordinator.drain(ctx).await
    }

    /// Drains outstanding notifications for at most [`Config::grace`].
    pub async fn stop_within_grace(&self) -> ShutdownOutcome {
        self.coordinator.drain_within(self.cfg.grace).await
    }

    /// Waits for a termination signal, then drains for at most [`Config::grace`].
    pub async fn shutdown_on_signal(&self) -> std::io::Result<ShutdownOutcome> {
        self.coordinator.drain_on_signal(self.cfg.grace).await
    }

    /// Current number of notifications still running.
    pub fn outstanding(&self) -> usize {
        self.runner.outstanding()
    }

    /// State of the shutdown coordinator.
    pub fn drain_state(&self) -> DrainState {
        self.coordinator.state()
    }

    /// Runner used for notifications (e.g. to cancel them after a timed-out drain).
    pub fn runner(&self) -> &TaskRunner {
        &self.runner
    }

    /// Coordinator for callers that need finer control over the drain.
    pub fn coordinator(&self) -> &ShutdownCoordinator {
        &self.coordinator
    }

    /// Subscribes directly to the event bus.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }
}

impl<S, N> Drop for Orchestrator<S, N>
where
    S: DurableStore,
    N: Notifier<Id = S::Id>,
{
    fn drop(&mut self) {
        self.listener.cancel();
    }
}

/// Builder for [`Orchestrator`].
pub struct OrchestratorBuilder<S, N> {
    cfg: Config,
    store: S,
    notifier: N,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl<S, N> OrchestratorBuilder<S, N>
where
    S: DurableStore,
    N: Notifier<Id = S::Id>,
{
    /// Creates a builder with no subscribers.
    pub fn new(cfg: Config, store: S, notifier: N) -> Self {
        Self {
            cfg,
            store,
            notifier,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers (logging, metrics, ...).
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Wires bus, subscribers, tracker, runner and coordinator.
    ///
    /// Must be called inside a tokio runtime.
    pub fn build(self) -> Arc<Orchestrator<S, N>> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let listener = CancellationToken::new();
        if !self.subscribers.is_empty() {
            let subs = SubscriberSet::new(self.subscribers, bus.clone());
            spawn_listener(bus.subscribe(), subs, listener.clone());
        }

        let work = OutstandingWork::new();
        let runner = TaskRunner::new(Arc::clone(&work), bus.clone(), self.cfg.task_timeout());
        let coordinator = ShutdownCoordinator::new(work.signal(), bus.clone());

        Arc::new(Orchestrator {
            cfg: self.cfg,
            store: self.store,
            notifier: Arc::new(self.notifier),
            bus,
            runner,
            coordinator,
            listener,
        })
    }
}

/// Forwards bus events to the subscriber set until cancelled.
fn spawn_listener(
    mut rx: broadcast::Receiver<Event>,
    subs: SubscriberSet,
    token: CancellationToken,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                msg = rx.recv() => match msg {
                    Ok(ev) => subs.emit(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        }
        subs.shutdown().await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NotifyError, StoreError};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Store;

    #[async_trait]
    impl DurableStore for Store {
        type Record = &'static str;
        type Id = u32;

        async fn write(&self, _ctx: &CancellationToken, name: &'static str) -> Result<u32, StoreError> {
            match name {
                "" => Err(StoreError::write("empty name")),
                _ => Ok(7),
            }
        }
    }

    #[derive(Default)]
    struct Notifications {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Notifier for Notifications {
        type Id = u32;

        async fn notify(&self, _ctx: CancellationToken, id: u32) -> Result<(), NotifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if id == 7 {
                Ok(())
            } else {
                Err(NotifyError::publish("unexpected id"))
            }
        }
    }

    struct Recorder(Arc<Mutex<Vec<EventKind>>>);

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.0.lock().unwrap().push(ev.kind);
        }
    }

    #[tokio::test]
    async fn write_failure_submits_nothing() {
        let svc = Orchestrator::builder(Config::default(), Store, Notifications::default()).build();
        let mut rx = svc.subscribe();

        let err = svc.execute(&CancellationToken::new(), "").await.unwrap_err();
        assert_eq!(err.store_error(), &StoreError::write("empty name"));
        assert_eq!(svc.outstanding(), 0);

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::WriteFailed);
        assert_eq!(ev.reason.as_deref(), Some("write rejected: empty name"));
    }

    #[tokio::test]
    async fn notification_task_is_named_after_id() {
        let svc = Orchestrator::builder(Config::default(), Store, Notifications::default()).build();
        let mut rx = svc.subscribe();

        let id = svc.execute(&CancellationToken::new(), "alice").await.unwrap();
        assert_eq!(id, 7);

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::TaskSubmitted);
        assert_eq!(ev.task.as_deref(), Some("notify:7"));
        assert_eq!(ev.outstanding, Some(1));

        assert_eq!(svc.drain_state(), DrainState::Idle);
        assert_eq!(svc.stop(&CancellationToken::new()).await, ShutdownOutcome::Drained);
        assert_eq!(svc.drain_state(), DrainState::Done(ShutdownOutcome::Drained));
        assert_eq!(svc.notifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_receive_events_through_listener() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let svc = Orchestrator::builder(Config::default(), Store, Notifications::default())
            .with_subscribers(vec![Arc::new(Recorder(seen.clone()))])
            .build();

        assert_eq!(svc.config().grace, Duration::from_secs(30));

        svc.execute(&CancellationToken::new(), "bob").await.unwrap();
        assert_eq!(svc.stop_within_grace().await, ShutdownOutcome::Drained);

        // listener and subscriber workers run on their own tasks
        tokio::time::sleep(Duration::from_millis(10)).await;

        let seen = seen.lock().unwrap();
        assert!(seen.contains(&EventKind::TaskSubmitted));
        assert!(seen.contains(&EventKind::TaskCompleted));
        assert!(seen.contains(&EventKind::Drained));
    }
}

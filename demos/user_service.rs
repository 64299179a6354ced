//! # Demo: user_service
//!
//! User registration: insert the user (slow, durable), then publish a
//! "user inserted" message without making the caller wait. On Ctrl-C / SIGTERM
//! the request loop stops admitting work and the service drains in-flight
//! publishes for at most `Config::grace`.
//!
//! ## Flow
//! ```text
//! request loop ──► Orchestrator::execute(name)
//!                    ├─► UserTable::write      (500ms)
//!                    └─► submit notify:{id}    (MessageBus::notify, 2s, detached)
//!
//! SIGINT/SIGTERM ──► stop request loop ──► Orchestrator::stop_within_grace()
//!                                            ├─ Drained  → exit 0
//!                                            └─ TimedOut → cancel stragglers, exit 0
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example user_service
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use drainvisor::{
    Config, DurableStore, LogWriter, Notifier, NotifyError, Orchestrator, ShutdownOutcome,
    StoreError, Subscribe, wait_for_shutdown_signal,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

struct UserTable {
    next_id: AtomicU64,
}

#[async_trait]
impl DurableStore for UserTable {
    type Record = String;
    type Id = u64;

    async fn write(&self, ctx: &CancellationToken, name: String) -> Result<u64, StoreError> {
        tokio::select! {
            _ = ctx.cancelled() => Err(StoreError::Canceled),
            _ = tokio::time::sleep(Duration::from_millis(500)) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                tracing::info!(id, %name, "user inserted");
                Ok(id)
            }
        }
    }
}

struct MessageBus;

#[async_trait]
impl Notifier for MessageBus {
    type Id = u64;

    async fn notify(&self, _ctx: CancellationToken, id: u64) -> Result<(), NotifyError> {
        tokio::time::sleep(Duration::from_secs(2)).await;
        if id % 5 == 0 {
            panic!("broker connection lost while publishing user {id}");
        }
        tracing::info!(id, "user-inserted message published");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = Config {
        grace: Duration::from_secs(5),
        ..Config::default()
    };
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let svc = Orchestrator::builder(
        cfg,
        UserTable {
            next_id: AtomicU64::new(1),
        },
        MessageBus,
    )
    .with_subscribers(subs)
    .build();

    let admit = CancellationToken::new();
    let requests = {
        let svc = Arc::clone(&svc);
        let admit = admit.clone();
        tokio::spawn(async move {
            let mut n = 0u64;
            let mut tick = tokio::time::interval(Duration::from_millis(700));
            loop {
                tokio::select! {
                    _ = admit.cancelled() => break,
                    _ = tick.tick() => {
                        n += 1;
                        let req = admit.child_token();
                        match svc.execute(&req, format!("user-{n}")).await {
                            Ok(id) => tracing::info!(id, "registration accepted"),
                            Err(e) => tracing::warn!(error = %e, label = e.as_label(), "registration failed"),
                        }
                    }
                }
            }
        })
    };

    let sig = wait_for_shutdown_signal().await?;
    tracing::info!(signal = %sig, "stopping request intake");
    admit.cancel();
    requests.await?;

    match svc.stop_within_grace().await {
        ShutdownOutcome::Drained => tracing::info!("all notifications delivered"),
        ShutdownOutcome::TimedOut => {
            tracing::warn!(outstanding = svc.outstanding(), "grace exceeded, abandoning notifications");
            svc.runner().cancel_outstanding();
        }
    }

    // let the LogWriter flush the final drain events
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use drainvisor::{DurableStore, Notifier, NotifyError, StoreError};
use tokio_util::sync::CancellationToken;

/// Store that sleeps for `latency`, then either fails or hands out sequential ids.
pub struct SlowStore {
    pub latency: Duration,
    pub fail_with: Option<StoreError>,
    next: AtomicU64,
}

impl SlowStore {
    pub fn ok(latency: Duration) -> Self {
        Self {
            latency,
            fail_with: None,
            next: AtomicU64::new(1),
        }
    }

    pub fn failing(err: StoreError) -> Self {
        Self {
            latency: Duration::ZERO,
            fail_with: Some(err),
            next: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl DurableStore for SlowStore {
    type Record = String;
    type Id = u64;

    async fn write(&self, _ctx: &CancellationToken, _name: String) -> Result<u64, StoreError> {
        tokio::time::sleep(self.latency).await;
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(self.next.fetch_add(1, Ordering::SeqCst)),
        }
    }
}

/// What a [`SlowNotifier`] does after sleeping.
#[derive(Clone, Copy, Debug)]
pub enum Behavior {
    Succeed,
    Fail,
    Panic,
}

/// Notifier that sleeps for `latency` and then behaves as configured.
pub struct SlowNotifier {
    pub latency: Duration,
    pub behavior: Behavior,
    pub finished: Arc<AtomicUsize>,
}

impl SlowNotifier {
    pub fn new(latency: Duration, behavior: Behavior) -> Self {
        Self {
            latency,
            behavior,
            finished: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Notifier for SlowNotifier {
    type Id = u64;

    async fn notify(&self, _ctx: CancellationToken, id: u64) -> Result<(), NotifyError> {
        tokio::time::sleep(self.latency).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail => Err(NotifyError::publish(format!("broker rejected {id}"))),
            Behavior::Panic => panic!("notifier crashed on {id}"),
        }
    }
}

/// In-memory `tracing` output, shared between the fmt layer and the test.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    /// Installs a plain-text fmt subscriber writing into this buffer for the current thread.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let buf = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || buf.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`. The closure
//! *creates* the future, so captured state is moved into each future explicitly
//! (clone `Arc`s inside the closure).
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use drainvisor::{TaskFn, TaskRef, TaskError};
//!
//! let t: TaskRef = TaskFn::arc("notify:7", |_ctx: CancellationToken| async move {
//!     Ok::<_, TaskError>(())
//! });
//!
//! assert_eq!(t.name(), "notify:7");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::task::{BoxTaskFuture, Task};

/// Shared handle to a task.
pub type TaskRef = Arc<dyn Task>;

/// Function-backed task implementation.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture {
        Box::pin((self.f)(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn each_spawn_builds_a_fresh_future() {
        let t = TaskFn::new("twice", |ctx: CancellationToken| async move {
            if ctx.is_cancelled() {
                return Err(TaskError::Canceled);
            }
            Ok(())
        });

        assert_eq!(t.spawn(CancellationToken::new()).await, Ok(()));

        let cancelled = CancellationToken::new();
        cancelled.cancel();
        assert_eq!(t.spawn(cancelled).await, Err(TaskError::Canceled));
    }
}

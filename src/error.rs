//! Error types used by the drainvisor service core and its collaborators.
//!
//! - [`ServiceError`] — the only error that crosses the request boundary.
//! - [`StoreError`] — raised by a [`DurableStore`](crate::DurableStore) write.
//! - [`NotifyError`] — raised by a [`Notifier`](crate::Notifier); never reaches the caller.
//! - [`TaskError`] — terminal outcome of a detached task body.
//!
//! All types provide `as_label` (stable snake_case) for logs/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors surfaced to the caller of [`Orchestrator::execute`](crate::Orchestrator::execute).
///
/// Only the synchronous write can fail a request. Notification problems are
/// contained inside the detached task and observed through events/logs.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The durable write failed; no notification was submitted.
    #[error("durable write failed: {0}")]
    Write(#[source] StoreError),
}

impl ServiceError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use drainvisor::{ServiceError, StoreError};
    ///
    /// let err = ServiceError::Write(StoreError::Canceled);
    /// assert_eq!(err.as_label(), "service_write_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::Write(_) => "service_write_failed",
        }
    }

    /// Returns the wrapped store error.
    pub fn store_error(&self) -> &StoreError {
        match self {
            ServiceError::Write(e) => e,
        }
    }
}

/// # Errors produced by a durable store write.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The write was rejected or the backend failed.
    #[error("write rejected: {reason}")]
    Write {
        /// Backend-provided reason.
        reason: String,
    },

    /// The request context was cancelled before the write completed.
    #[error("write cancelled")]
    Canceled,
}

impl StoreError {
    /// Shorthand for [`StoreError::Write`].
    pub fn write(reason: impl Into<String>) -> Self {
        StoreError::Write {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            StoreError::Write { .. } => "store_write",
            StoreError::Canceled => "store_canceled",
        }
    }
}

/// # Errors produced by a notifier.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// Publishing the notification failed.
    #[error("publish failed: {reason}")]
    Publish {
        /// Transport-provided reason.
        reason: String,
    },

    /// The task token was cancelled before publishing completed.
    #[error("publish cancelled")]
    Canceled,
}

impl NotifyError {
    /// Shorthand for [`NotifyError::Publish`].
    pub fn publish(reason: impl Into<String>) -> Self {
        NotifyError::Publish {
            reason: reason.into(),
        }
    }
}

impl From<NotifyError> for TaskError {
    fn from(e: NotifyError) -> Self {
        match e {
            NotifyError::Canceled => TaskError::Canceled,
            other => TaskError::Fail {
                error: other.to_string(),
            },
        }
    }
}

/// # Terminal outcome of a detached task body.
///
/// None of these are retried; they exist so the runner can publish the right
/// event and log line before releasing the task's outstanding-work guard.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task body returned an error.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task exceeded the configured per-task timeout.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// Task body panicked; the panic was contained at the task boundary.
    #[error("panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// Task observed cancellation of its token and exited.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use drainvisor::TaskError;
    ///
    /// let err = TaskError::Panicked { info: "boom".into() };
    /// assert_eq!(err.as_label(), "task_panicked");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            TaskError::Panicked { info } => format!("panic: {info}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }
}

/// Renders a caught panic payload as text.
pub(crate) fn panic_info(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

//! # Durable store contract.

use std::fmt;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::StoreError;

/// Synchronous dependency of a request: persists a record and returns its id.
///
/// Any error fails the request. The orchestrator never retries.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use drainvisor::{DurableStore, StoreError};
///
/// struct Users;
///
/// #[async_trait]
/// impl DurableStore for Users {
///     type Record = String;
///     type Id = u64;
///
///     async fn write(&self, ctx: &CancellationToken, name: String) -> Result<u64, StoreError> {
///         if ctx.is_cancelled() {
///             return Err(StoreError::Canceled);
///         }
///         if name.is_empty() {
///             return Err(StoreError::write("empty name"));
///         }
///         Ok(1)
///     }
/// }
/// ```
#[async_trait]
pub trait DurableStore: Send + Sync + 'static {
    /// Input accepted by a request.
    type Record: Send + 'static;
    /// Identifier handed to the notifier after a successful write.
    type Id: Clone + fmt::Display + Send + Sync + 'static;

    /// Persists `record`. `ctx` is the request's context.
    async fn write(&self, ctx: &CancellationToken, record: Self::Record) -> Result<Self::Id, StoreError>;
}

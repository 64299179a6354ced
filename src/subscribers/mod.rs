//! # Event subscribers.
//!
//! ```text
//! Bus ──► listener ──► SubscriberSet ──┬──► LogWriter (tracing)
//!                                      ├──► Metrics
//!                                      └──► Custom ...
//! ```
//!
//! - [`Subscribe`] - trait for custom observers
//! - [`SubscriberSet`] - bounded, panic-isolated fan-out
//! - `LogWriter` - built-in `tracing` renderer (feature `logging`)

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;

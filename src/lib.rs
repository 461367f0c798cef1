//! adhd: cancellation, deadlines and request-scoped values for threads.
//!
//! # Overview
//!
//! A context is a node in a tree that lets independent concurrent operations
//! share a cooperative cancellation signal, an optional deadline and a chain
//! of immutable key/value bindings. Combinators race several contexts
//! against each other.
//!
//! # Core Guarantees
//!
//! - **Single transition**: a cancelable node completes at most once; the
//!   first cause (cancel or deadline) wins and later ones are no-ops
//! - **Consistent reads**: a reader that sees a node done also sees its error
//! - **No dangling timers**: cancelling or releasing a deadline node disarms
//!   its timer first
//! - **Idempotent cancel**: [`CancelHandle::cancel`] is safe to call any
//!   number of times from any number of threads
//!
//! # Module Structure
//!
//! - [`context`]: the [`Context`] trait and the node constructors
//! - [`combinator`]: [`select`], [`race`], [`is_done`], [`wait_for`]
//! - [`sync`]: the completion [`Signal`](sync::Signal) and the
//!   [`Pending`](sync::Pending) single-value handoff
//! - [`time`]: the background timer driver behind deadlines
//! - [`config`]: timer thread configuration and environment overrides
//! - [`error`]: the two terminal errors
//!
//! # Example
//!
//! ```
//! use adhd::context::{background, with_cancel, with_timeout};
//! use adhd::{is_done, select, Error};
//! use std::time::Duration;
//!
//! let (shutdown, trigger) = with_cancel(&background());
//! let (timeout, _cancel) = with_timeout(&background(), Duration::from_secs(30));
//!
//! trigger.cancel();
//! assert!(is_done(&*shutdown));
//!
//! let first = select([shutdown, timeout]).recv().expect("one winner");
//! assert_eq!(first.index, 0);
//! assert_eq!(first.error, Some(Error::Canceled));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

pub mod combinator;
pub mod config;
pub mod context;
pub mod error;
pub mod sync;
pub mod time;
pub mod tracing_compat;

#[cfg(test)]
pub(crate) mod test_utils;

pub use combinator::{
    is_done, race, select, wait_for, wait_for_async, wait_for_timeout, Raced, Selected,
};
pub use config::{ConfigError, TimerConfig};
pub use context::{
    background, todo, with_cancel, with_deadline, with_timeout, with_value, CancelGuard,
    CancelHandle, Context, ContextKey, DynContext,
};
pub use error::Error;

//! Combinators over contexts.
//!
//! - [`select`]: first of several contexts to complete, with its position
//! - [`race`]: first of several contexts to complete
//! - [`is_done`] / [`wait_for`]: observe a single context
//!
//! # Winner semantics
//!
//! A call spawns one watcher thread that observes every candidate's
//! completion signal at once. The first candidate it sees complete is
//! published through a first-wins gate; later completions are discarded.
//! When several candidates are already complete at call time, which one
//! wins is unspecified.
//!
//! Losers are not cancelled. The watcher exits as soon as it has published
//! and drops its wakers from the losing signals. Candidates that can never
//! complete (their [`done`](crate::context::Context::done) is `None`) are
//! not watched.

mod race;
mod select;
mod wait;
mod watch;

pub use race::{race, Raced};
pub use select::{select, Selected};
pub use wait::{is_done, wait_for, wait_for_async, wait_for_timeout};

//! Synchronization building blocks for contexts and combinators.
//!
//! # Primitives
//!
//! - [`Signal`]: one-shot broadcast completion signal (poll, block, or await)
//! - [`Pending`]: single-value handoff whose first publisher wins
//!
//! Both are safe to observe from any number of threads at once.

pub mod pending;
mod signal;

pub use pending::{channel, Pending, Publisher};
pub use signal::{Fired, Signal};

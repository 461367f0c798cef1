//! Time primitives: scheduled callbacks for deadline contexts.
//!
//! - [`TimerDriver`]: fires callbacks at a fixed [`Instant`](std::time::Instant)
//!   from a background thread
//! - [`TimerHandle`]: identifies a registration so it can be disarmed
//!
//! Deadline contexts register on [`TimerDriver::global`]. Standalone drivers
//! are useful when a component wants its own timer thread.

mod driver;

pub use driver::{TimerDriver, TimerHandle};

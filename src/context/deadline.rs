//! Deadline and timeout contexts.

use super::cancel::CancelContext;
use super::{CancelHandle, Context, ContextKey, DynContext, Value};
use crate::error::Error;
use crate::sync::Signal;
use crate::time::TimerDriver;
use crate::tracing_compat::{debug, trace};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Upper bound applied to timeouts so `now + timeout` stays representable.
const MAX_TIMEOUT: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// A cancelable context that also completes at a fixed instant.
///
/// Completes with whichever happens first: the cancel handle
/// ([`Error::Canceled`]) or the deadline ([`Error::DeadlineExceeded`]).
#[derive(Debug)]
pub struct DeadlineContext {
    base: CancelContext,
    deadline: Instant,
}

impl Context for DeadlineContext {
    fn done(&self) -> Option<&Signal> {
        self.base.done()
    }

    fn err(&self) -> Option<Error> {
        self.base.err()
    }

    fn value(&self, key: &dyn ContextKey) -> Option<&Value> {
        self.base.value(key)
    }

    fn deadline(&self) -> Option<Instant> {
        Some(self.deadline)
    }
}

/// Derives a child of `parent` that completes at `deadline`.
///
/// If `deadline` is not in the future the child is returned already
/// completed with [`Error::DeadlineExceeded`] and no timer is armed.
/// Otherwise a timer is armed on [`TimerDriver::global`]; the returned
/// handle disarms it before cancelling.
///
/// [`Context::deadline`] reports `deadline` for the life of the context,
/// completed or not.
#[must_use]
pub fn with_deadline(parent: &DynContext, deadline: Instant) -> (DynContext, CancelHandle) {
    deadline_from(TimerDriver::global(), parent, deadline, Instant::now())
}

/// Derives a child of `parent` that completes `timeout` from now.
///
/// The clock is sampled once; both the armed timer and the reported
/// deadline derive from that sample.
///
/// # Example
///
/// ```
/// use adhd::context::{background, with_timeout};
/// use adhd::{wait_for, Error};
/// use std::time::Duration;
///
/// let (ctx, _cancel) = with_timeout(&background(), Duration::from_millis(20));
/// assert_eq!(wait_for(&*ctx), Some(Error::DeadlineExceeded));
/// ```
#[must_use]
pub fn with_timeout(parent: &DynContext, timeout: Duration) -> (DynContext, CancelHandle) {
    let now = Instant::now();
    deadline_from(TimerDriver::global(), parent, now + timeout.min(MAX_TIMEOUT), now)
}

fn deadline_from(
    driver: &'static TimerDriver,
    parent: &DynContext,
    deadline: Instant,
    now: Instant,
) -> (DynContext, CancelHandle) {
    let base = CancelContext::new(parent);
    let handle = base.handle();
    let state = Arc::clone(base.state());

    if deadline <= now {
        state.complete(Error::DeadlineExceeded);
        debug!("deadline already passed at construction");
    } else {
        let weak = Arc::downgrade(&state);
        let timer = driver.register(deadline, move || {
            if let Some(state) = weak.upgrade() {
                state.complete(Error::DeadlineExceeded);
            }
        });
        state.arm(driver, timer);
        trace!(
            timer_id = timer.id(),
            remaining = ?deadline.duration_since(now),
            "deadline armed"
        );
    }

    (Arc::new(DeadlineContext { base, deadline }), handle)
}

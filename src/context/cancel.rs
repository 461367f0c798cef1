//! Cancelable contexts and their cancel capability.

use super::{Context, ContextKey, DynContext, Value};
use crate::error::Error;
use crate::sync::Signal;
use crate::time::{TimerDriver, TimerHandle};
use crate::tracing_compat::trace;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// A deadline timer together with the driver it was registered on.
#[derive(Debug, Clone, Copy)]
struct ArmedTimer {
    driver: &'static TimerDriver,
    handle: TimerHandle,
}

impl ArmedTimer {
    fn disarm(self) -> bool {
        self.driver.cancel(&self.handle)
    }
}

#[derive(Debug, Default)]
struct CancelInner {
    err: Option<Error>,
    timer: Option<ArmedTimer>,
}

/// Completion state shared by a cancelable node and its [`CancelHandle`].
///
/// The terminal error and the completion signal only change together while
/// `inner` is locked. The deadline timer, if any, is disarmed under the
/// same lock.
#[derive(Debug)]
pub(crate) struct CancelState {
    inner: Mutex<CancelInner>,
    done: Signal,
}

impl CancelState {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(CancelInner::default()),
            done: Signal::new(),
        }
    }

    pub(crate) fn err(&self) -> Option<Error> {
        self.inner.lock().err
    }

    pub(crate) const fn done(&self) -> &Signal {
        &self.done
    }

    #[cfg(test)]
    pub(crate) fn armed_timer(&self) -> Option<TimerHandle> {
        self.inner.lock().timer.map(|timer| timer.handle)
    }

    /// Records the armed deadline timer so cancellation can disarm it.
    pub(crate) fn arm(&self, driver: &'static TimerDriver, handle: TimerHandle) {
        let mut inner = self.inner.lock();
        if inner.err.is_none() {
            inner.timer = Some(ArmedTimer { driver, handle });
        }
    }

    /// Completes with `reason` unless already completed.
    ///
    /// Returns true for the call that performed the transition.
    pub(crate) fn complete(&self, reason: Error) -> bool {
        let mut inner = self.inner.lock();
        inner.timer = None;
        if inner.err.is_some() {
            return false;
        }
        inner.err = Some(reason);
        self.done.fire();
        trace!(reason = %reason, "context completed");
        true
    }

    /// Disarms the deadline timer, then completes with [`Error::Canceled`].
    fn cancel(&self) -> bool {
        let mut inner = self.inner.lock();
        if let Some(timer) = inner.timer.take() {
            timer.disarm();
        }
        if inner.err.is_some() {
            return false;
        }
        inner.err = Some(Error::Canceled);
        self.done.fire();
        trace!("context canceled");
        true
    }
}

impl Drop for CancelState {
    fn drop(&mut self) {
        if let Some(timer) = self.inner.get_mut().timer.take() {
            timer.disarm();
        }
    }
}

/// A context completed by an explicit [`CancelHandle::cancel`].
///
/// Values and deadline come from the parent.
#[derive(Debug)]
pub struct CancelContext {
    parent: DynContext,
    state: Arc<CancelState>,
}

impl CancelContext {
    pub(crate) fn new(parent: &DynContext) -> Self {
        Self {
            parent: Arc::clone(parent),
            state: Arc::new(CancelState::new()),
        }
    }

    pub(crate) fn state(&self) -> &Arc<CancelState> {
        &self.state
    }

    pub(crate) fn handle(&self) -> CancelHandle {
        CancelHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl Context for CancelContext {
    fn done(&self) -> Option<&Signal> {
        Some(self.state.done())
    }

    fn err(&self) -> Option<Error> {
        self.state.err()
    }

    fn value(&self, key: &dyn ContextKey) -> Option<&Value> {
        self.parent.value(key)
    }

    fn deadline(&self) -> Option<Instant> {
        self.parent.deadline()
    }
}

/// The cancel capability returned alongside a cancelable context.
///
/// Idempotent and thread-safe: cancel zero, one or many times from any
/// number of threads; only the first call (or an earlier deadline) has an
/// effect. Clones cancel the same context.
#[derive(Clone)]
pub struct CancelHandle {
    state: Arc<CancelState>,
}

impl CancelHandle {
    /// Cancels the context.
    ///
    /// For a deadline context the timer is disarmed first. If the context
    /// already completed, nothing changes.
    pub fn cancel(&self) {
        self.state.cancel();
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &CancelState {
        &self.state
    }

    /// Returns a guard that cancels the context when dropped.
    #[must_use]
    pub fn drop_guard(self) -> CancelGuard {
        CancelGuard {
            handle: self,
            armed: true,
        }
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("err", &self.state.err())
            .finish()
    }
}

/// Cancels its context when dropped, unless [`disarm`](Self::disarm)ed.
#[derive(Debug)]
#[must_use = "dropping the guard cancels the context immediately"]
pub struct CancelGuard {
    handle: CancelHandle,
    armed: bool,
}

impl CancelGuard {
    /// Releases the handle without cancelling.
    #[must_use]
    pub fn disarm(mut self) -> CancelHandle {
        self.armed = false;
        self.handle.clone()
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if self.armed {
            self.handle.cancel();
        }
    }
}

/// Derives a child of `parent` that completes when the returned handle is
/// invoked.
///
/// # Example
///
/// ```
/// use adhd::context::{background, with_cancel};
/// use adhd::{is_done, Error};
///
/// let (ctx, cancel) = with_cancel(&background());
/// assert!(!is_done(&*ctx));
///
/// cancel.cancel();
/// cancel.cancel();
/// assert!(is_done(&*ctx));
/// assert_eq!(ctx.err(), Some(Error::Canceled));
/// ```
#[must_use]
pub fn with_cancel(parent: &DynContext) -> (DynContext, CancelHandle) {
    let ctx = CancelContext::new(parent);
    let handle = ctx.handle();
    (Arc::new(ctx), handle)
}

//! One-shot broadcast completion signal.
//!
//! [`Signal`] starts unfired and fires exactly once. Any number of
//! observers can watch it at the same time, each in the style it needs:
//!
//! - [`Signal::is_fired`]: non-blocking poll
//! - [`Signal::wait`], [`Signal::wait_timeout`], [`Signal::wait_until`]:
//!   block the calling thread on a condition variable
//! - [`Signal::fired`]: a future for async callers
//!
//! The fired flag is only ever set while the waiter lock is held, so a
//! blocking waiter that saw it unset cannot miss the notification.

use parking_lot::{Condvar, Mutex};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

/// A one-shot, many-waiter completion signal.
///
/// # Example
///
/// ```
/// use adhd::sync::Signal;
/// use std::sync::Arc;
/// use std::thread;
///
/// let signal = Arc::new(Signal::new());
/// let waiter = {
///     let signal = Arc::clone(&signal);
///     thread::spawn(move || signal.wait())
/// };
///
/// assert!(signal.fire());
/// assert!(!signal.fire());
/// waiter.join().unwrap();
/// assert!(signal.is_fired());
/// ```
#[derive(Debug)]
pub struct Signal {
    /// Set once, under `waiters`.
    fired: AtomicBool,
    /// Async wakers registered before the signal fired.
    waiters: Mutex<Vec<Waker>>,
    /// Blocking waiters park here.
    cvar: Condvar,
}

impl Signal {
    /// Creates an unfired signal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fired: AtomicBool::new(false),
            waiters: Mutex::new(Vec::new()),
            cvar: Condvar::new(),
        }
    }

    /// Fires the signal, releasing every current and future waiter.
    ///
    /// Returns `true` for the call that performed the transition and
    /// `false` for every later call.
    pub fn fire(&self) -> bool {
        let wakers = {
            let mut waiters = self.waiters.lock();
            if self.fired.swap(true, Ordering::AcqRel) {
                return false;
            }
            self.cvar.notify_all();
            std::mem::take(&mut *waiters)
        };

        // Wake outside the lock.
        for waker in wakers {
            waker.wake();
        }
        true
    }

    /// Returns true if the signal has fired. Never blocks.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Blocks the calling thread until the signal fires.
    pub fn wait(&self) {
        if self.is_fired() {
            return;
        }
        let mut guard = self.waiters.lock();
        while !self.is_fired() {
            self.cvar.wait(&mut guard);
        }
    }

    /// Blocks until the signal fires or `timeout` elapses.
    ///
    /// Returns true if the signal fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.wait_until(deadline),
            None => {
                self.wait();
                true
            }
        }
    }

    /// Blocks until the signal fires or `deadline` is reached.
    ///
    /// Returns true if the signal fired.
    pub fn wait_until(&self, deadline: Instant) -> bool {
        if self.is_fired() {
            return true;
        }
        let mut guard = self.waiters.lock();
        while !self.is_fired() {
            if self.cvar.wait_until(&mut guard, deadline).timed_out() {
                return self.is_fired();
            }
        }
        true
    }

    /// Returns a future that resolves once the signal has fired.
    pub const fn fired(&self) -> Fired<'_> {
        Fired { signal: self }
    }

    /// Polls for the fired state, registering `cx`'s waker if still unfired.
    pub fn poll_fired(&self, cx: &mut Context<'_>) -> Poll<()> {
        if self.is_fired() {
            return Poll::Ready(());
        }
        let mut waiters = self.waiters.lock();
        if self.is_fired() {
            return Poll::Ready(());
        }
        if !waiters.iter().any(|w| w.will_wake(cx.waker())) {
            waiters.push(cx.waker().clone());
        }
        Poll::Pending
    }

    /// Withdraws wakers registered through [`poll_fired`](Self::poll_fired)
    /// that wake the same task as `waker`.
    ///
    /// For an observer that stops watching before the signal fires.
    pub fn forget_waker(&self, waker: &Waker) {
        self.waiters.lock().retain(|w| !w.will_wake(waker));
    }

    #[cfg(test)]
    pub(crate) fn waiter_count(&self) -> usize {
        self.waiters.lock().len()
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

/// Future returned by [`Signal::fired`].
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct Fired<'a> {
    signal: &'a Signal,
}

impl Future for Fired<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.signal.poll_fired(cx)
    }
}

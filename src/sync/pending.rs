//! Single-value handoff with a first-publisher-wins gate.
//!
//! [`channel`] returns a cloneable [`Publisher`] and one [`Pending`]
//! receiver. Any number of publishers may race to [`Publisher::publish`];
//! exactly one value is accepted. The receiver yields that value once and
//! `None` on every receive after it.
//!
//! The value is stored before the internal [`Signal`] fires, so a receiver
//! woken by the signal always finds it.

use super::signal::Signal;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

enum Slot<T> {
    Empty,
    Full(T),
    Taken,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    ready: Signal,
}

/// Creates a connected publisher/receiver pair.
#[must_use]
pub fn channel<T>() -> (Publisher<T>, Pending<T>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(Slot::Empty),
        ready: Signal::new(),
    });
    (
        Publisher {
            shared: Arc::clone(&shared),
        },
        Pending { shared },
    )
}

/// Sending half of a [`channel`].
pub struct Publisher<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Publisher<T> {
    /// Offers `value` as the single result.
    ///
    /// Returns `true` if this call won the gate. Losing values are dropped.
    pub fn publish(&self, value: T) -> bool {
        {
            let mut slot = self.shared.slot.lock();
            if !matches!(*slot, Slot::Empty) {
                return false;
            }
            *slot = Slot::Full(value);
        }
        self.shared.ready.fire();
        true
    }

    /// Returns true once some publisher has won the gate.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.shared.ready.is_fired()
    }
}

impl<T> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for Publisher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("published", &self.is_published())
            .finish()
    }
}

/// Receiving half of a [`channel`]: an asynchronous single value.
///
/// Blocking callers use [`recv`](Self::recv) or
/// [`recv_timeout`](Self::recv_timeout); async callers `.await` it.
#[must_use = "a pending result does nothing unless received"]
pub struct Pending<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Pending<T> {
    /// Returns true if a value has been published, whether or not it has
    /// been received yet.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.shared.ready.is_fired()
    }

    /// Returns true once the value has been handed out.
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        matches!(*self.shared.slot.lock(), Slot::Taken)
    }

    /// Takes the value if it is available, without blocking.
    pub fn try_recv(&mut self) -> Option<T> {
        if !self.shared.ready.is_fired() {
            return None;
        }
        self.take()
    }

    /// Blocks until the value is published and takes it.
    ///
    /// Returns `None` if the value was already received. Blocks forever if
    /// nothing is ever published.
    pub fn recv(&mut self) -> Option<T> {
        if self.is_consumed() {
            return None;
        }
        self.shared.ready.wait();
        self.take()
    }

    /// Like [`recv`](Self::recv), giving up after `timeout`.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<T> {
        if self.is_consumed() || !self.shared.ready.wait_timeout(timeout) {
            return None;
        }
        self.take()
    }

    fn take(&self) -> Option<T> {
        let mut slot = self.shared.slot.lock();
        match std::mem::replace(&mut *slot, Slot::Taken) {
            Slot::Full(value) => Some(value),
            Slot::Taken => None,
            Slot::Empty => {
                *slot = Slot::Empty;
                None
            }
        }
    }
}

impl<T> Future for Pending<T> {
    type Output = Option<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        if self.is_consumed() {
            return Poll::Ready(None);
        }
        match self.shared.ready.poll_fired(cx) {
            Poll::Ready(()) => Poll::Ready(self.take()),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending")
            .field("ready", &self.is_ready())
            .field("consumed", &self.is_consumed())
            .finish()
    }
}

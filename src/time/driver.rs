//! Timer driver that fires scheduled callbacks from a background thread.
//!
//! Registrations live in a min-heap ordered by deadline plus a table of
//! live callbacks keyed by timer id. Cancelling removes the callback from
//! the table; the stale heap entry is skipped when it surfaces.
//!
//! The driver thread is spawned on first registration. It sleeps on a
//! condition variable until the earliest deadline (or a new registration)
//! and runs expired callbacks after releasing the driver lock, so a
//! callback may take other locks, including ones held by a thread that is
//! blocked cancelling a timer. A panicking callback is caught and logged;
//! the thread keeps serving the remaining timers.

use crate::config::TimerConfig;
use crate::tracing_compat::{debug, trace, warn};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Instant;

type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Stale heap entries tolerated before the heap is rebuilt.
const COMPACT_THRESHOLD: usize = 64;

static GLOBAL: OnceLock<TimerDriver> = OnceLock::new();

/// Opaque handle for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    id: u64,
    deadline: Instant,
}

impl TimerHandle {
    /// Returns the timer identifier.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns the instant the timer is scheduled for.
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }
}

struct DriverState {
    heap: BinaryHeap<Reverse<(Instant, u64)>>,
    callbacks: HashMap<u64, Callback>,
    next_id: u64,
    thread_started: bool,
    shutdown: bool,
}

impl DriverState {
    fn compact(&mut self) {
        let callbacks = &self.callbacks;
        self.heap.retain(|Reverse((_, id))| callbacks.contains_key(id));
    }

    fn pop_expired(&mut self, now: Instant) -> Vec<Callback> {
        let mut due = Vec::new();
        while let Some(&Reverse((deadline, id))) = self.heap.peek() {
            if deadline > now {
                break;
            }
            self.heap.pop();
            if let Some(callback) = self.callbacks.remove(&id) {
                due.push(callback);
            }
        }
        due
    }
}

struct DriverInner {
    config: TimerConfig,
    state: Mutex<DriverState>,
    cvar: Condvar,
}

/// Schedules callbacks to run at a fixed [`Instant`].
///
/// # Example
///
/// ```
/// use adhd::config::TimerConfig;
/// use adhd::time::TimerDriver;
/// use std::sync::mpsc;
/// use std::time::{Duration, Instant};
///
/// let driver = TimerDriver::new(TimerConfig::default());
/// let (tx, rx) = mpsc::channel();
/// driver.register(Instant::now() + Duration::from_millis(10), move || {
///     tx.send("fired").unwrap();
/// });
/// assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok("fired"));
/// ```
pub struct TimerDriver {
    inner: Arc<DriverInner>,
}

impl TimerDriver {
    /// Creates a driver. Its thread starts on the first registration.
    #[must_use]
    pub fn new(mut config: TimerConfig) -> Self {
        config.normalize();
        Self {
            inner: Arc::new(DriverInner {
                config,
                state: Mutex::new(DriverState {
                    heap: BinaryHeap::new(),
                    callbacks: HashMap::new(),
                    next_id: 0,
                    thread_started: false,
                    shutdown: false,
                }),
                cvar: Condvar::new(),
            }),
        }
    }

    /// Returns the process-wide driver used by deadline contexts.
    ///
    /// Built on first use from [`TimerConfig::from_env`].
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(|| Self::new(TimerConfig::from_env()))
    }

    /// Returns this driver's configuration.
    #[must_use]
    pub fn config(&self) -> &TimerConfig {
        &self.inner.config
    }

    /// Schedules `callback` to run on the driver thread at `deadline`.
    ///
    /// A deadline that has already passed fires on the next driver pass.
    pub fn register<F>(&self, deadline: Instant, callback: F) -> TimerHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.inner.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.heap.push(Reverse((deadline, id)));
        state.callbacks.insert(id, Box::new(callback));
        self.ensure_thread(&mut state);
        drop(state);

        self.inner.cvar.notify_one();
        trace!(timer_id = id, "timer registered");
        TimerHandle { id, deadline }
    }

    /// Disarms a timer.
    ///
    /// Returns true if the timer was still armed. Returns false if it had
    /// already fired (or is firing right now) or was cancelled before.
    pub fn cancel(&self, handle: &TimerHandle) -> bool {
        let mut state = self.inner.state.lock();
        let removed = state.callbacks.remove(&handle.id).is_some();
        if removed && state.heap.len() > state.callbacks.len() * 2 + COMPACT_THRESHOLD {
            state.compact();
        }
        trace!(timer_id = handle.id, removed, "timer cancelled");
        removed
    }

    /// Returns the number of armed timers.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.state.lock().callbacks.len()
    }

    /// Returns the earliest armed deadline, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        let state = self.inner.state.lock();
        state
            .heap
            .iter()
            .filter(|Reverse((_, id))| state.callbacks.contains_key(id))
            .map(|Reverse((deadline, _))| *deadline)
            .min()
    }

    fn ensure_thread(&self, state: &mut MutexGuard<'_, DriverState>) {
        if state.thread_started {
            return;
        }
        let inner = Arc::clone(&self.inner);
        thread::Builder::new()
            .name(self.inner.config.thread_name.clone())
            .stack_size(self.inner.config.stack_size)
            .spawn(move || run(&inner))
            .expect("failed to spawn timer thread");
        state.thread_started = true;
        debug!(thread = %self.inner.config.thread_name, "timer thread started");
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.inner.state.lock().shutdown = true;
        self.inner.cvar.notify_all();
    }
}

impl fmt::Debug for TimerDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("TimerDriver")
            .field("config", &self.inner.config)
            .field("pending", &state.callbacks.len())
            .field("thread_started", &state.thread_started)
            .finish()
    }
}

fn run(inner: &DriverInner) {
    let mut state = inner.state.lock();
    loop {
        if state.shutdown {
            break;
        }

        let due = state.pop_expired(Instant::now());
        if !due.is_empty() {
            trace!(count = due.len(), "firing expired timers");
            MutexGuard::unlocked(&mut state, || {
                for callback in due {
                    fire(callback);
                }
            });
            continue;
        }

        match state.heap.peek() {
            Some(&Reverse((deadline, _))) => {
                inner.cvar.wait_until(&mut state, deadline);
            }
            None => inner.cvar.wait(&mut state),
        }
    }
    debug!("timer thread stopped");
}

#[cfg_attr(not(feature = "tracing-integration"), allow(unused_variables))]
fn fire(callback: Callback) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(callback)) {
        let message = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("<non-string panic payload>");
        warn!(panic = %message, "timer callback panicked");
    }
}

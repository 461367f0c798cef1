//! The watcher thread shared by `select` and `race`.
//!
//! One thread per call watches every candidate. It registers a waker on
//! each candidate's completion signal and parks; a firing signal unparks
//! it, so the thread does no work until some candidate completes. Once the
//! winner is published the thread withdraws its wakers from the losing
//! signals and exits, releasing every candidate.

use crate::context::DynContext;
use crate::sync::{channel, Pending, Publisher, Signal};
use crate::tracing_compat::trace;
use std::sync::Arc;
use std::task::{Context as TaskContext, Wake, Waker};
use std::thread::{self, Thread};

struct Unpark(Thread);

impl Wake for Unpark {
    fn wake(self: Arc<Self>) {
        self.0.unpark();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.0.unpark();
    }
}

/// Watches `contexts` and publishes `build(index, context)` for the first
/// one observed complete.
///
/// With no candidates the default result is published immediately.
pub(super) fn first_completed<T, F>(
    kind: &'static str,
    contexts: Vec<DynContext>,
    build: F,
) -> Pending<T>
where
    T: Default + Send + 'static,
    F: Fn(usize, DynContext) -> T + Send + 'static,
{
    let (publisher, pending) = channel();

    if contexts.is_empty() {
        publisher.publish(T::default());
        trace!(kind, "no candidates, published empty result");
        return pending;
    }

    // Already-complete candidates need no thread.
    if let Some(index) = contexts
        .iter()
        .position(|ctx| ctx.done().is_some_and(Signal::is_fired))
    {
        let ctx = Arc::clone(&contexts[index]);
        publisher.publish(build(index, ctx));
        trace!(kind, index, "candidate already complete");
        return pending;
    }

    // Candidates without a signal can never win.
    let candidates: Vec<(usize, DynContext)> = contexts
        .into_iter()
        .enumerate()
        .filter(|(_, ctx)| ctx.done().is_some())
        .collect();
    if candidates.is_empty() {
        trace!(kind, "no candidate can complete, nothing to watch");
        return pending;
    }

    thread::Builder::new()
        .name(format!("adhd-{kind}"))
        .spawn(move || watch(&candidates, &publisher, &build))
        .expect("failed to spawn combinator watcher thread");
    pending
}

fn watch<T, F>(candidates: &[(usize, DynContext)], publisher: &Publisher<T>, build: &F)
where
    F: Fn(usize, DynContext) -> T,
{
    let waker = Waker::from(Arc::new(Unpark(thread::current())));
    let mut cx = TaskContext::from_waker(&waker);

    let winner = loop {
        let ready = candidates.iter().position(|(_, ctx)| {
            ctx.done()
                .is_some_and(|done| done.poll_fired(&mut cx).is_ready())
        });
        if let Some(winner) = ready {
            break winner;
        }
        thread::park();
    };

    for (_, ctx) in candidates {
        if let Some(done) = ctx.done() {
            done.forget_waker(&waker);
        }
    }

    let (index, ctx) = &candidates[winner];
    if publisher.publish(build(*index, Arc::clone(ctx))) {
        trace!(index, error = ?ctx.err(), "winner published");
    }
}

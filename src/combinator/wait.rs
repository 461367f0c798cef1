//! Observing a single context.

use crate::context::Context;
use crate::error::Error;
use crate::sync::Signal;
use std::thread;
use std::time::Duration;

/// Returns true if `ctx` has completed. Never blocks.
///
/// Always false for contexts that can never complete.
pub fn is_done<C: Context + ?Sized>(ctx: &C) -> bool {
    ctx.done().is_some_and(Signal::is_fired)
}

/// Blocks until `ctx` completes and returns its terminal error.
///
/// A context that can never complete (a root, or values over a root)
/// parks the calling thread forever.
pub fn wait_for<C: Context + ?Sized>(ctx: &C) -> Option<Error> {
    let Some(done) = ctx.done() else {
        loop {
            thread::park();
        }
    };
    done.wait();
    ctx.err()
}

/// Like [`wait_for`], giving up after `timeout`.
///
/// Returns `None` if `ctx` did not complete in time.
pub fn wait_for_timeout<C: Context + ?Sized>(ctx: &C, timeout: Duration) -> Option<Error> {
    match ctx.done() {
        Some(done) if done.wait_timeout(timeout) => ctx.err(),
        Some(_) => None,
        None => {
            thread::sleep(timeout);
            None
        }
    }
}

/// Waits for `ctx` to complete without blocking a thread.
///
/// Never resolves for a context that can never complete.
pub async fn wait_for_async<C: Context + ?Sized>(ctx: &C) -> Option<Error> {
    match ctx.done() {
        Some(done) => {
            done.fired().await;
            ctx.err()
        }
        None => std::future::pending().await,
    }
}

//! Root contexts.

use super::{Context, ContextKey, DynContext, Value};
use crate::error::Error;
use crate::sync::Signal;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

static BACKGROUND: OnceLock<DynContext> = OnceLock::new();
static TODO: OnceLock<DynContext> = OnceLock::new();

/// Which root constructor produced an [`EmptyContext`].
///
/// The two kinds behave identically; the kind only records intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmptyKind {
    /// The top-level context for a process, request or test.
    Background,
    /// A placeholder where the right parent is not known yet.
    Todo,
}

/// A root context: never completes, carries no values and no deadline.
#[derive(Debug)]
pub struct EmptyContext {
    kind: EmptyKind,
}

impl EmptyContext {
    /// Returns which root constructor produced this context.
    #[must_use]
    pub const fn kind(&self) -> EmptyKind {
        self.kind
    }
}

impl Context for EmptyContext {
    fn done(&self) -> Option<&Signal> {
        None
    }

    fn err(&self) -> Option<Error> {
        None
    }

    fn value(&self, _key: &dyn ContextKey) -> Option<&Value> {
        None
    }

    fn deadline(&self) -> Option<Instant> {
        None
    }
}

/// Returns the root context.
///
/// Stateless and shared: every call returns the same instance.
#[must_use]
pub fn background() -> DynContext {
    Arc::clone(BACKGROUND.get_or_init(|| {
        Arc::new(EmptyContext {
            kind: EmptyKind::Background,
        })
    }))
}

/// Returns a root context marking a spot where the proper parent is not
/// yet plumbed through. Behaves exactly like [`background()`].
#[must_use]
pub fn todo() -> DynContext {
    Arc::clone(TODO.get_or_init(|| {
        Arc::new(EmptyContext {
            kind: EmptyKind::Todo,
        })
    }))
}

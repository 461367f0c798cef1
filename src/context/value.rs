//! Value-carrying contexts.

use super::{Context, ContextKey, DynContext, Value};
use crate::error::Error;
use crate::sync::Signal;
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

/// A context binding one key to one value.
///
/// Completion, error and deadline are exactly the parent's: `done()`
/// returns the parent's signal itself, not a copy.
#[derive(Debug)]
pub struct ValueContext {
    parent: DynContext,
    key: Box<dyn ContextKey>,
    value: Value,
}

impl Context for ValueContext {
    fn done(&self) -> Option<&Signal> {
        self.parent.done()
    }

    fn err(&self) -> Option<Error> {
        self.parent.err()
    }

    fn value(&self, key: &dyn ContextKey) -> Option<&Value> {
        if self.key.key_eq(key) {
            Some(&self.value)
        } else {
            self.parent.value(key)
        }
    }

    fn deadline(&self) -> Option<Instant> {
        self.parent.deadline()
    }
}

/// Derives a child of `parent` that binds `key` to `value`.
///
/// Lookups check the nearest binding first, so a child binding shadows the
/// same key further up the chain.
#[must_use]
pub fn with_value<K, V>(parent: &DynContext, key: K, value: V) -> DynContext
where
    K: ContextKey,
    V: Any + Send + Sync,
{
    Arc::new(ValueContext {
        parent: Arc::clone(parent),
        key: Box::new(key),
        value: Arc::new(value),
    })
}

//! Context tree: cancellation, deadlines and request-scoped values.
//!
//! A context is a node in a tree rooted at [`background()`] (or [`todo()`]).
//! Children are derived from a parent handle:
//!
//! - [`with_cancel`]: completes with [`Error::Canceled`] when its
//!   [`CancelHandle`] is invoked
//! - [`with_deadline`] / [`with_timeout`]: additionally completes with
//!   [`Error::DeadlineExceeded`] when its deadline passes
//! - [`with_value`]: binds one key/value pair and otherwise behaves exactly
//!   like its parent
//!
//! Children hold their parent through an [`Arc`]; parents never reference
//! children, so the tree cannot form a cycle and every parent lives at
//! least as long as the children that hold it.
//!
//! # Completion
//!
//! A cancelable node completes at most once. Its error and its completion
//! [`Signal`] change together under the node lock, so any observer that
//! sees the signal fired also sees the error. The first transition is
//! final; later cancels and timer firings are no-ops.
//!
//! Completion does not flow from a parent to its children: a child only
//! completes through its own cancel capability or deadline.
//!
//! # Example
//!
//! ```
//! use adhd::context::{background, with_cancel, with_value};
//! use adhd::Error;
//!
//! let root = background();
//! let scoped = with_value(&root, "request-id", 7_u64);
//! let (ctx, cancel) = with_cancel(&scoped);
//!
//! assert_eq!(ctx.err(), None);
//! assert_eq!(adhd::context::value_of::<u64>(&*ctx, &"request-id"), Some(&7));
//!
//! cancel.cancel();
//! assert_eq!(ctx.err(), Some(Error::Canceled));
//! ```

mod cancel;
mod deadline;
mod empty;
mod value;

pub use cancel::{with_cancel, CancelContext, CancelGuard, CancelHandle};
pub use deadline::{with_deadline, with_timeout, DeadlineContext};
pub use empty::{background, todo, EmptyContext, EmptyKind};
pub use value::{with_value, ValueContext};

use crate::error::Error;
use crate::sync::Signal;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Shared handle to any context node.
pub type DynContext = Arc<dyn Context>;

/// A value bound with [`with_value`].
pub type Value = Arc<dyn Any + Send + Sync>;

/// The capability set every context node provides.
///
/// Implementations must keep [`err`](Self::err) and [`done`](Self::done)
/// consistent: once the signal has fired, `err` returns the terminal error
/// and never changes again.
pub trait Context: Send + Sync + fmt::Debug {
    /// The completion signal, or `None` for a context that can never
    /// complete.
    fn done(&self) -> Option<&Signal>;

    /// The terminal error, or `None` while the context is active.
    fn err(&self) -> Option<Error>;

    /// Looks up the value bound to `key`, nearest binding first.
    fn value(&self, key: &dyn ContextKey) -> Option<&Value>;

    /// The deadline after which this context completes on its own.
    fn deadline(&self) -> Option<Instant>;
}

impl<C: Context + ?Sized> Context for Arc<C> {
    fn done(&self) -> Option<&Signal> {
        (**self).done()
    }

    fn err(&self) -> Option<Error> {
        (**self).err()
    }

    fn value(&self, key: &dyn ContextKey) -> Option<&Value> {
        (**self).value(key)
    }

    fn deadline(&self) -> Option<Instant> {
        (**self).deadline()
    }
}

/// A key usable with [`with_value`].
///
/// Implemented for every `'static` type with `PartialEq + Debug`. Two keys
/// match only if they have the same concrete type and compare equal, so
/// `"id"` (a `&str`) and `String::from("id")` are different keys. Private
/// unit structs make collision-free keys:
///
/// ```
/// use adhd::context::{background, with_value, value_of};
///
/// #[derive(Debug, PartialEq)]
/// struct RequestId;
///
/// let ctx = with_value(&background(), RequestId, 42_u32);
/// assert_eq!(value_of::<u32>(&*ctx, &RequestId), Some(&42));
/// ```
pub trait ContextKey: Any + Send + Sync + fmt::Debug {
    /// Returns true if `other` is the same key.
    fn key_eq(&self, other: &dyn ContextKey) -> bool;

    /// Upcasts to [`Any`] for type-checked comparison.
    fn as_any(&self) -> &dyn Any;
}

impl<T> ContextKey for T
where
    T: Any + PartialEq + Send + Sync + fmt::Debug,
{
    fn key_eq(&self, other: &dyn ContextKey) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Looks up `key` on `ctx` and downcasts the value to `T`.
///
/// Returns `None` if the key is unbound or bound to a value of another type.
pub fn value_of<'a, T: Any>(ctx: &'a dyn Context, key: &dyn ContextKey) -> Option<&'a T> {
    ctx.value(key)
        .and_then(|value| (**value).downcast_ref::<T>())
}

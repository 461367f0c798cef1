//! Select: the first of several contexts to complete, with its position.

use super::watch::first_completed;
use crate::context::DynContext;
use crate::error::Error;
use crate::sync::Pending;

/// Outcome of [`select`].
///
/// The [`Default`] value (no context, index 0, no error) is what `select`
/// yields when given no candidates.
#[derive(Debug, Clone, Default)]
pub struct Selected {
    /// The context that completed first.
    pub context: Option<DynContext>,
    /// Its position in the candidate list.
    pub index: usize,
    /// Its terminal error, sampled right after it completed.
    pub error: Option<Error>,
}

/// Waits for the first of `contexts` to complete.
///
/// Returns immediately. The returned [`Pending`] yields exactly one
/// [`Selected`] and `None` on every receive after it. It yields nothing if
/// no candidate ever completes.
///
/// # Example
///
/// ```
/// use adhd::context::{background, with_cancel, with_timeout};
/// use adhd::{select, Error};
/// use std::time::Duration;
///
/// let (slow, _cancel_slow) = with_cancel(&background());
/// let (fast, _cancel_fast) = with_timeout(&background(), Duration::from_millis(10));
///
/// let mut pending = select([slow, fast]);
/// let selected = pending.recv().expect("one result");
/// assert_eq!(selected.index, 1);
/// assert_eq!(selected.error, Some(Error::DeadlineExceeded));
/// assert!(pending.recv().is_none());
/// ```
pub fn select<I>(contexts: I) -> Pending<Selected>
where
    I: IntoIterator<Item = DynContext>,
{
    first_completed("select", contexts.into_iter().collect(), |index, context| {
        let error = context.err();
        Selected {
            context: Some(context),
            index,
            error,
        }
    })
}

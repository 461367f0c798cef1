//! Race: the first of several contexts to complete.

use super::watch::first_completed;
use crate::context::DynContext;
use crate::error::Error;
use crate::sync::Pending;

/// Outcome of [`race`].
///
/// The [`Default`] value (no context, no error) is what `race` yields when
/// given no candidates.
#[derive(Debug, Clone, Default)]
pub struct Raced {
    /// The context that completed first.
    pub context: Option<DynContext>,
    /// Its terminal error, sampled right after it completed.
    pub error: Option<Error>,
}

/// Like [`select`](super::select) without the winner's position.
pub fn race<I>(contexts: I) -> Pending<Raced>
where
    I: IntoIterator<Item = DynContext>,
{
    first_completed("race", contexts.into_iter().collect(), |_index, context| {
        let error = context.err();
        Raced {
            context: Some(context),
            error,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{background, with_cancel, with_deadline, with_timeout};
    use crate::test_utils::init_test_logging;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    #[test]
    fn empty_yields_zero_result_then_none() {
        init_test_logging();
        let mut pending = race(Vec::new());
        let raced = pending.recv().expect("empty race yields once");
        assert!(raced.context.is_none());
        assert_eq!(raced.error, None);
        assert!(pending.recv().is_none());
    }

    #[test]
    fn first_cancel_wins() {
        init_test_logging();
        let (a, ca) = with_cancel(&background());
        let (b, _cb) = with_timeout(&background(), Duration::from_secs(60));
        let mut pending = race([Arc::clone(&a), b]);
        ca.cancel();

        let raced = pending
            .recv_timeout(Duration::from_secs(5))
            .expect("winner published");
        assert_eq!(raced.error, Some(Error::Canceled));
        assert!(Arc::ptr_eq(&raced.context.expect("winner context"), &a));
    }

    #[test]
    fn expired_candidate_wins_immediately() {
        init_test_logging();
        let past = Instant::now()
            .checked_sub(Duration::from_secs(1))
            .expect("a second ago is representable");
        let (expired, _c) = with_deadline(&background(), past);
        let (open, _o) = with_cancel(&background());

        let mut pending = race([open, expired]);
        let raced = pending.try_recv().expect("decided at call time");
        assert_eq!(raced.error, Some(Error::DeadlineExceeded));
    }

    #[test]
    fn later_completions_are_discarded() {
        init_test_logging();
        let (a, ca) = with_cancel(&background());
        let (b, cb) = with_cancel(&background());
        let mut pending = race([a, Arc::clone(&b)]);
        cb.cancel();
        let raced = pending
            .recv_timeout(Duration::from_secs(5))
            .expect("winner published");
        ca.cancel();

        assert!(Arc::ptr_eq(&raced.context.expect("winner context"), &b));
        assert!(pending.recv_timeout(Duration::from_millis(50)).is_none());
    }
}

//! Terminal error kinds for contexts.
//!
//! A context reports no error while it is active. Once it completes it
//! reports exactly one of two terminal kinds, and that value never changes:
//!
//! - [`Error::Canceled`]: an explicit cancel capability was invoked
//! - [`Error::DeadlineExceeded`]: the context's deadline passed
//!
//! Both are plain `Copy` values compared by variant, so callers match on
//! them directly instead of inspecting formatted strings.

/// The reason a context completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Error {
    /// The context was canceled by its cancel capability.
    #[error("context canceled")]
    Canceled,
    /// The context's deadline passed before it was canceled.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

impl Error {
    /// Returns true for [`Error::Canceled`].
    #[must_use]
    pub const fn is_canceled(self) -> bool {
        matches!(self, Self::Canceled)
    }

    /// Returns true for [`Error::DeadlineExceeded`].
    #[must_use]
    pub const fn is_deadline_exceeded(self) -> bool {
        matches!(self, Self::DeadlineExceeded)
    }
}

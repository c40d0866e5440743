//! The seam between the retry engine and its delay schedule.

use std::time::Duration;

/// Decides how long the engine waits before re-invoking a failed operation.
///
/// The engine only asks for a delay once it has decided to retry: the
/// attempt budget is not spent and the retry predicate accepted the failure.
/// Whether to retry is never the strategy's call.
///
/// # Examples
///
/// ```rust
/// use deferred_retry::{BackoffStrategy, RetryPolicy};
/// use std::time::Duration;
///
/// /// Waits the same amount of time after every failure.
/// struct Fixed(Duration);
///
/// impl BackoffStrategy for Fixed {
///     fn next_delay(&self, _attempt: u32) -> Duration {
///         self.0
///     }
/// }
///
/// let policy = RetryPolicy::new(5).with_strategy(Fixed(Duration::from_millis(50)));
/// assert_eq!(policy.max_attempts(), 5);
/// ```
pub trait BackoffStrategy: Send + Sync {
    /// Calculate the delay after a failed attempt.
    ///
    /// # Parameters
    /// - `attempt`: The number of the attempt that just failed (1-indexed)
    ///
    /// # Notes
    ///
    /// This is called AFTER a failure and BEFORE sleeping. The first failure
    /// calls `next_delay(1)` before the second invocation.
    fn next_delay(&self, attempt: u32) -> Duration;
}

impl<S: BackoffStrategy + ?Sized> BackoffStrategy for &S {
    fn next_delay(&self, attempt: u32) -> Duration {
        (**self).next_delay(attempt)
    }
}

impl<S: BackoffStrategy + ?Sized> BackoffStrategy for Box<S> {
    fn next_delay(&self, attempt: u32) -> Duration {
        (**self).next_delay(attempt)
    }
}

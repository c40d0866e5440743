//! Delayed values and the timer seam used between retry attempts.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Resolve with `value` once at least `delay` has elapsed.
///
/// The returned future never fails. It always yields to the scheduler before
/// arming its sleep, so even a zero delay resolves on a later scheduling
/// tick rather than inside the poll that started it. Dropping the future
/// abandons the wait.
///
/// # Examples
///
/// ```rust
/// use deferred_retry::delayed_value;
/// use std::time::Duration;
///
/// # async fn example() {
/// let value = delayed_value(Duration::from_millis(10), "ready").await;
/// assert_eq!(value, "ready");
/// # }
/// ```
pub fn delayed_value<T>(delay: Duration, value: T) -> impl Future<Output = T> {
    async move {
        tokio::task::yield_now().await;
        tokio::time::sleep(delay).await;
        value
    }
}

/// A source of delays for the retry engine.
///
/// The engine performs every backoff wait through a `Timer`, which lets
/// callers observe or replace the waits (for example to record the delays
/// chosen in a test).
#[async_trait]
pub trait Timer: Send + Sync {
    /// Wait for at least `delay`.
    async fn sleep(&self, delay: Duration);
}

/// The default [`Timer`], backed by the tokio time driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    async fn sleep(&self, delay: Duration) {
        delayed_value(delay, ()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio_test::{assert_pending, task};

    #[tokio::test]
    async fn test_resolves_with_value_after_delay() {
        let start = Instant::now();
        let value = delayed_value(Duration::from_millis(30), 7u32).await;

        assert_eq!(value, 7);
        assert!(
            start.elapsed() >= Duration::from_millis(30),
            "resolved after {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn test_zero_delay_is_deferred() {
        let mut pending = task::spawn(delayed_value(Duration::ZERO, "later"));
        assert_pending!(pending.poll());

        assert_eq!(delayed_value(Duration::ZERO, "later").await, "later");
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_timer_sleeps() {
        let start = tokio::time::Instant::now();
        TokioTimer.sleep(Duration::from_secs(5)).await;

        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}

//! The retry engine and its combinators.

use super::exponential::JitteredBackoff;
use super::strategy::BackoffStrategy;
use crate::timer::{TokioTimer, Timer};
use std::future::Future;

/// Re-invoke `operation` until it succeeds or `max_attempts` invocations
/// have failed, waiting a jittered exponential backoff between attempts.
///
/// The returned future resolves with the first success, or with the error of
/// the last attempt once the budget is spent. A `max_attempts` of 0 or 1
/// invokes the operation exactly once.
///
/// # Examples
///
/// ```rust
/// use deferred_retry::retry;
///
/// # async fn example() {
/// let result: Result<u32, &str> = retry(|| async { Err("unavailable") }, 3).await;
/// assert_eq!(result, Err("unavailable"));
/// # }
/// ```
pub async fn retry<F, Fut, R, E>(operation: F, max_attempts: u32) -> Result<R, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    RetryPolicy::new(max_attempts).execute(operation).await
}

/// Like [`retry`], but stop as soon as `should_retry` returns `false` for a
/// failure.
///
/// `should_retry` sees each failure before the engine decides to wait. It is
/// not consulted for the failure that exhausts the attempt budget.
///
/// # Examples
///
/// ```rust
/// use deferred_retry::retry_while;
///
/// #[derive(Debug, PartialEq)]
/// enum FetchError {
///     Busy,
///     NotFound,
/// }
///
/// # async fn example() {
/// let result: Result<(), FetchError> = retry_while(
///     || async { Err(FetchError::NotFound) },
///     |err| *err == FetchError::Busy,
///     10,
/// )
/// .await;
///
/// // `NotFound` is not worth retrying, so only one attempt is made.
/// assert_eq!(result, Err(FetchError::NotFound));
/// # }
/// ```
pub async fn retry_while<F, Fut, R, E, P>(
    operation: F,
    should_retry: P,
    max_attempts: u32,
) -> Result<R, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<R, E>>,
    P: Fn(&E) -> bool,
{
    RetryPolicy::new(max_attempts)
        .execute_while(operation, should_retry)
        .await
}

/// A reusable retry configuration.
///
/// Holds the attempt budget, the [`BackoffStrategy`] that spaces attempts
/// apart, and the [`Timer`] that performs the waits. Each call to
/// [`execute`](Self::execute) or [`execute_while`](Self::execute_while)
/// starts an independent session; a policy can drive any number of sessions
/// concurrently.
///
/// # Examples
///
/// ```rust
/// use deferred_retry::{JitteredBackoff, RetryPolicy};
/// use std::time::Duration;
///
/// # async fn example() {
/// let policy = RetryPolicy::new(5).with_strategy(
///     JitteredBackoff::builder()
///         .multiplier(Duration::from_millis(100))
///         .max_delay(Duration::from_secs(2))
///         .build(),
/// );
///
/// let value = policy.execute(|| async { Ok::<_, String>(42) }).await;
/// assert_eq!(value, Ok(42));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy<S = JitteredBackoff, T = TokioTimer> {
    max_attempts: u32,
    strategy: S,
    timer: T,
}

impl RetryPolicy {
    /// Create a policy allowing up to `max_attempts` invocations, with the
    /// default [`JitteredBackoff`] and [`TokioTimer`].
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            strategy: JitteredBackoff::default(),
            timer: TokioTimer,
        }
    }
}

impl Default for RetryPolicy {
    /// Three attempts with the default backoff.
    fn default() -> Self {
        Self::new(3)
    }
}

impl<S, T> RetryPolicy<S, T> {
    /// Replace the backoff strategy.
    pub fn with_strategy<S2>(self, strategy: S2) -> RetryPolicy<S2, T> {
        RetryPolicy {
            max_attempts: self.max_attempts,
            strategy,
            timer: self.timer,
        }
    }

    /// Replace the timer used for backoff waits.
    pub fn with_timer<T2>(self, timer: T2) -> RetryPolicy<S, T2> {
        RetryPolicy {
            max_attempts: self.max_attempts,
            strategy: self.strategy,
            timer,
        }
    }

    /// Maximum number of invocations per session.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// The backoff strategy.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }
}

impl<S, T> RetryPolicy<S, T>
where
    S: BackoffStrategy,
    T: Timer,
{
    /// Run `operation`, retrying every failure until the budget is spent.
    pub async fn execute<F, Fut, R, E>(&self, operation: F) -> Result<R, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        self.execute_while(operation, |_: &E| true).await
    }

    /// Run `operation`, retrying failures accepted by `should_retry` until
    /// the budget is spent.
    ///
    /// Invocations are strictly sequential. The error of the final attempt is
    /// returned unchanged; earlier errors are dropped.
    pub async fn execute_while<F, Fut, R, E, P>(
        &self,
        mut operation: F,
        should_retry: P,
    ) -> Result<R, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, E>>,
        P: Fn(&E) -> bool,
    {
        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);

            match operation().await {
                Ok(value) => return Ok(value),
                // Exhaustion is checked first; the predicate never sees the
                // final failure.
                Err(err) if attempts >= self.max_attempts || !should_retry(&err) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        attempts,
                        max_attempts = self.max_attempts,
                        "giving up after failed attempt"
                    );
                    return Err(err);
                }
                Err(_) => {
                    let delay = self.strategy.next_delay(attempts);

                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        attempt = attempts,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "attempt failed, retrying after backoff"
                    );

                    self.timer.sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Records requested delays instead of sleeping.
    #[derive(Clone, Default)]
    struct RecordingTimer {
        delays: Arc<Mutex<Vec<Duration>>>,
    }

    impl RecordingTimer {
        fn delays(&self) -> Vec<Duration> {
            self.delays.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Timer for RecordingTimer {
        async fn sleep(&self, delay: Duration) {
            self.delays.lock().unwrap().push(delay);
            tokio::task::yield_now().await;
        }
    }

    /// Fails `failures` times with `"rejected"`, then succeeds with `"foo"`.
    fn flaky(
        failures: u32,
        calls: &Arc<AtomicU32>,
    ) -> impl FnMut() -> std::future::Ready<Result<&'static str, &'static str>> + use<> {
        let calls = Arc::clone(calls);
        move || {
            let current = calls.fetch_add(1, Ordering::SeqCst);
            if current < failures {
                std::future::ready(Err("rejected"))
            } else {
                std::future::ready(Ok("foo"))
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_success_on_third_attempt() {
        let calls = Arc::new(AtomicU32::new(0));

        let result = retry(flaky(2, &calls), 3).await;

        assert_eq!(result, Ok("foo"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_attempts_exceeded() {
        let calls = Arc::new(AtomicU32::new(0));

        let result = retry(flaky(5, &calls), 3).await;

        assert_eq!(result, Err("rejected"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_immediate_success() {
        let timer = RecordingTimer::default();
        let policy = RetryPolicy::new(3).with_timer(timer.clone());

        let result = policy.execute(|| async { Ok::<_, String>(42) }).await;

        assert_eq!(result, Ok(42));
        assert!(timer.delays().is_empty());
    }

    #[tokio::test]
    async fn test_one_wait_per_retry() {
        let timer = RecordingTimer::default();
        let policy = RetryPolicy::new(10).with_timer(timer.clone());
        let calls = Arc::new(AtomicU32::new(0));

        let result = policy.execute(flaky(4, &calls)).await;

        assert_eq!(result, Ok("foo"));
        assert_eq!(calls.load(Ordering::SeqCst), 5);

        let delays = timer.delays();
        assert_eq!(delays.len(), 4);
        let backoff = JitteredBackoff::default();
        for (index, delay) in delays.iter().enumerate() {
            let range = backoff.delay_range(index as u32 + 1);
            let millis = delay.as_secs_f64() * 1000.0;
            assert!(
                millis >= range.start().max(0.0) - 1e-3 && millis <= *range.end() + 1e-3,
                "delay {:?} for attempt {} outside {:?}",
                delay,
                index + 1,
                range
            );
        }
    }

    #[tokio::test]
    async fn test_predicate_false_stops_immediately() {
        let timer = RecordingTimer::default();
        let policy = RetryPolicy::new(1000).with_timer(timer.clone());
        let calls = Arc::new(AtomicU32::new(0));

        let result = policy
            .execute_while(flaky(5, &calls), |_: &&str| false)
            .await;

        assert_eq!(result, Err("rejected"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(timer.delays().is_empty());
    }

    #[tokio::test]
    async fn test_predicate_not_consulted_on_exhaustion() {
        let policy = RetryPolicy::new(3).with_timer(RecordingTimer::default());
        let calls = Arc::new(AtomicU32::new(0));
        let checks = AtomicU32::new(0);

        let result = policy
            .execute_while(flaky(u32::MAX, &calls), |_| {
                checks.fetch_add(1, Ordering::SeqCst);
                true
            })
            .await;

        assert_eq!(result, Err("rejected"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(checks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_attempts_tries_once() {
        let timer = RecordingTimer::default();
        let policy = RetryPolicy::new(0).with_timer(timer.clone());
        let calls = Arc::new(AtomicU32::new(0));

        let result = policy.execute(flaky(1, &calls)).await;

        assert_eq!(result, Err("rejected"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(timer.delays().is_empty());
    }

    #[tokio::test]
    async fn test_custom_strategy_is_consulted() {
        struct Fixed;

        impl BackoffStrategy for Fixed {
            fn next_delay(&self, attempt: u32) -> Duration {
                Duration::from_secs(attempt as u64)
            }
        }

        let timer = RecordingTimer::default();
        let policy = RetryPolicy::new(4)
            .with_strategy(Fixed)
            .with_timer(timer.clone());
        let calls = Arc::new(AtomicU32::new(0));

        let result = policy.execute(flaky(u32::MAX, &calls)).await;

        assert_eq!(result, Err("rejected"));
        assert_eq!(
            timer.delays(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(3)
            ]
        );
    }

    #[test]
    fn test_policy_defaults() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.strategy(), &JitteredBackoff::default());
    }
}

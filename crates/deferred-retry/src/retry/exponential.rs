//! Exponential backoff with jitter.

use super::strategy::BackoffStrategy;
use rand::Rng;
use std::ops::RangeInclusive;
use std::time::Duration;

/// The value multiplied by successively higher powers of 2 when calculating
/// the delay between attempts.
pub const BACKOFF_MULTIPLIER: Duration = Duration::from_millis(20);

/// Exponential backoff with a jitter band that never shrinks below the
/// multiplier.
///
/// # Mathematical Formula
///
/// For failed attempt `n` (1-indexed):
/// ```text
/// base       = 2^(n-1) * multiplier
/// half_range = max(multiplier, 0.25 * base)
/// delay      = base + uniform(-half_range, +half_range)
/// ```
///
/// Negative results are clamped to zero. When a `max_delay` is configured the
/// final delay is capped at it.
///
/// | attempt | base  | range          |
/// |---------|-------|----------------|
/// | 1       | 20ms  | 0ms ..= 40ms   |
/// | 2       | 40ms  | 20ms ..= 60ms  |
/// | 3       | 80ms  | 60ms ..= 100ms |
/// | 4       | 160ms | 120ms ..= 200ms|
///
/// # Examples
///
/// ```rust
/// use deferred_retry::{BackoffStrategy, JitteredBackoff};
/// use std::time::Duration;
///
/// let backoff = JitteredBackoff::default();
/// let delay = backoff.next_delay(3);
/// assert!(delay >= Duration::from_millis(60) && delay <= Duration::from_millis(100));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct JitteredBackoff {
    multiplier: Duration,
    max_delay: Option<Duration>,
}

impl JitteredBackoff {
    /// Create a new builder for configuring jittered backoff.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferred_retry::JitteredBackoff;
    /// use std::time::Duration;
    ///
    /// let backoff = JitteredBackoff::builder()
    ///     .multiplier(Duration::from_millis(100))
    ///     .max_delay(Duration::from_secs(5))
    ///     .build();
    /// ```
    pub fn builder() -> JitteredBackoffBuilder {
        JitteredBackoffBuilder::default()
    }

    /// The multiplier applied to each power of 2.
    pub fn multiplier(&self) -> Duration {
        self.multiplier
    }

    /// The cap applied to every delay, if any.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// The un-jittered delay after failed attempt `attempt`, in milliseconds.
    pub fn base_millis(&self, attempt: u32) -> f64 {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        2f64.powi(exponent) * self.multiplier_millis()
    }

    /// The closed interval, in milliseconds, the delay for `attempt` is drawn
    /// from before clamping and capping.
    pub fn delay_range(&self, attempt: u32) -> RangeInclusive<f64> {
        let base = self.base_millis(attempt);
        let half_range = self.half_range_millis(base);
        (base - half_range)..=(base + half_range)
    }

    fn multiplier_millis(&self) -> f64 {
        self.multiplier.as_secs_f64() * 1000.0
    }

    fn half_range_millis(&self, base: f64) -> f64 {
        self.multiplier_millis().max(0.25 * base)
    }
}

impl Default for JitteredBackoff {
    /// Doubling backoff starting from [`BACKOFF_MULTIPLIER`], with no cap.
    fn default() -> Self {
        Self {
            multiplier: BACKOFF_MULTIPLIER,
            max_delay: None,
        }
    }
}

impl BackoffStrategy for JitteredBackoff {
    fn next_delay(&self, attempt: u32) -> Duration {
        let base = self.base_millis(attempt);
        let half_range = self.half_range_millis(base);
        let jitter = if half_range > 0.0 && half_range.is_finite() {
            rand::thread_rng().gen_range(-half_range..=half_range)
        } else {
            0.0
        };

        let delay = millis_to_duration(base + jitter);
        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }
}

/// Convert a millisecond count into a `Duration`, rounded to the nearest
/// nanosecond. Negative and NaN inputs clamp to zero, overflow saturates.
pub(crate) fn millis_to_duration(millis: f64) -> Duration {
    Duration::from_nanos((millis * 1_000_000.0).round() as u64)
}

/// Builder for configuring `JitteredBackoff`.
#[derive(Debug, Default)]
pub struct JitteredBackoffBuilder {
    multiplier: Option<Duration>,
    max_delay: Option<Duration>,
}

impl JitteredBackoffBuilder {
    /// Set the multiplier applied to each power of 2.
    ///
    /// Default: 20ms
    pub fn multiplier(mut self, multiplier: Duration) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    /// Cap every delay at `max_delay`.
    ///
    /// Default: no cap
    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Build the `JitteredBackoff` instance.
    pub fn build(self) -> JitteredBackoff {
        JitteredBackoff {
            multiplier: self.multiplier.unwrap_or(BACKOFF_MULTIPLIER),
            max_delay: self.max_delay,
        }
    }
}

//! Retry engine and backoff implementations.
//!
//! This module provides the retry combinators together with the delay
//! schedule they use between attempts.
//!
//! # Key Types
//!
//! - [`RetryPolicy`] - Attempt budget, backoff strategy and timer
//! - [`BackoffStrategy`] - Core trait for delay schedules
//! - [`JitteredBackoff`] - Exponential backoff with jitter
//!
//! # Examples
//!
//! ```rust
//! use deferred_retry::retry::{RetryPolicy, retry_while};
//!
//! # async fn example() -> Result<(), std::io::Error> {
//! let value = retry_while(
//!     || async { Ok::<_, std::io::Error>(42) },
//!     |err| err.kind() == std::io::ErrorKind::TimedOut,
//!     5,
//! )
//! .await?;
//!
//! let policy = RetryPolicy::new(3);
//! let again = policy.execute(|| async { Ok::<_, std::io::Error>(value) }).await?;
//! # Ok(())
//! # }
//! ```

mod engine;
mod exponential;
mod strategy;

pub use engine::{RetryPolicy, retry, retry_while};
pub use exponential::{BACKOFF_MULTIPLIER, JitteredBackoff, JitteredBackoffBuilder};
pub use strategy::BackoffStrategy;

#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Retry asynchronous operations with jittered exponential backoff.
//!
//! This crate re-invokes a fallible async operation until it succeeds, a
//! caller-supplied predicate declines the failure, or the attempt budget is
//! spent. Between attempts it waits a randomized, exponentially growing
//! delay.
//!
//! - **Combinators**: [`retry`] and [`retry_while`]
//! - **Configurable engine**: [`RetryPolicy`] with a pluggable
//!   [`BackoffStrategy`] and [`Timer`]
//! - **Delay primitive**: [`delayed_value`]
//! - **Configuration**: [`RetryConfig`], loadable from TOML or JSON
//!
//! The operation's own error is returned unchanged when the session gives
//! up. Only the last failure is reported.
//!
//! # Examples
//!
//! ```rust
//! use deferred_retry::retry;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! # async fn example() {
//! let calls = Arc::new(AtomicU32::new(0));
//! let result = retry(
//!     || {
//!         let calls = Arc::clone(&calls);
//!         async move {
//!             if calls.fetch_add(1, Ordering::SeqCst) < 2 {
//!                 Err("busy")
//!             } else {
//!                 Ok("foo")
//!             }
//!         }
//!     },
//!     3,
//! )
//! .await;
//!
//! assert_eq!(result, Ok("foo"));
//! # }
//! ```

pub mod config;
pub mod error;
pub mod retry;
pub mod timer;

pub use config::RetryConfig;
pub use error::ConfigError;
pub use retry::{
    BACKOFF_MULTIPLIER, BackoffStrategy, JitteredBackoff, JitteredBackoffBuilder, RetryPolicy,
    retry, retry_while,
};
pub use timer::{TokioTimer, Timer, delayed_value};

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use deferred_retry::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::RetryConfig;
    pub use crate::error::ConfigError;
    pub use crate::retry::{BackoffStrategy, JitteredBackoff, RetryPolicy, retry, retry_while};
    pub use crate::timer::{TokioTimer, Timer, delayed_value};
}

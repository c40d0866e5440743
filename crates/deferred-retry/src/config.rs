//! Retry configuration
//!
//! [`RetryConfig`] is the serializable form of a [`RetryPolicy`]. It can be
//! embedded in an application's own config file and turned into a policy
//! with [`RetryConfig::into_policy`].
//!
//! ```toml
//! max_attempts = 5
//! multiplier_ms = 50
//! max_delay_ms = 2000
//! ```

use crate::error::{ConfigError, Result};
use crate::retry::{JitteredBackoff, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Serializable retry settings.
///
/// Missing fields take their defaults when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of invocations per session
    pub max_attempts: u32,

    /// Backoff multiplier in milliseconds
    pub multiplier_ms: u64,

    /// Upper bound on any single delay, in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_delay_ms: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier_ms: 20,
            max_delay_ms: None,
        }
    }
}

impl RetryConfig {
    /// Parse a configuration from a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a JSON document.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values are consistent with each other.
    pub fn validate(&self) -> Result<()> {
        if let Some(max_delay_ms) = self.max_delay_ms
            && max_delay_ms < self.multiplier_ms
        {
            return Err(ConfigError::Invalid(format!(
                "max_delay_ms ({}) is smaller than multiplier_ms ({})",
                max_delay_ms, self.multiplier_ms
            )));
        }
        Ok(())
    }

    /// Build the backoff schedule described by this configuration.
    pub fn backoff(&self) -> JitteredBackoff {
        let builder =
            JitteredBackoff::builder().multiplier(Duration::from_millis(self.multiplier_ms));
        let builder = match self.max_delay_ms {
            Some(max_delay_ms) => builder.max_delay(Duration::from_millis(max_delay_ms)),
            None => builder,
        };
        builder.build()
    }

    /// Validate and build a [`RetryPolicy`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferred_retry::RetryConfig;
    ///
    /// let policy = RetryConfig::from_toml_str("max_attempts = 5")?.into_policy()?;
    /// assert_eq!(policy.max_attempts(), 5);
    /// # Ok::<(), deferred_retry::ConfigError>(())
    /// ```
    pub fn into_policy(self) -> Result<RetryPolicy> {
        self.validate()?;
        Ok(RetryPolicy::new(self.max_attempts).with_strategy(self.backoff()))
    }
}

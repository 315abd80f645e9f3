//! Gateway tuning settings
//!
//! Defines the throttle/retry configuration and its loading logic

use anyhow::{Context, Result};
use std::time::Duration;

/// Default minimum spacing between consecutive upstream calls
pub const DEFAULT_THROTTLE_DELAY_MS: u64 = 1000;

/// Default base delay for exponential backoff after a 429
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 2000;

/// Default maximum number of upstream attempts per request
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default upstream request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Runtime tuning for the completion gateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Minimum spacing between consecutive upstream calls, applied
    /// when a request reaches the front of the queue
    pub throttle_delay: Duration,
    /// Base delay for exponential backoff; attempt n sleeps
    /// `backoff_base * 2^n` before the next attempt
    pub backoff_base: Duration,
    /// Maximum number of upstream attempts per request
    pub max_retries: u32,
    /// Upstream request timeout
    pub request_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            throttle_delay: Duration::from_millis(DEFAULT_THROTTLE_DELAY_MS),
            backoff_base: Duration::from_millis(DEFAULT_BACKOFF_BASE_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl GatewayConfig {
    /// Load tuning overrides from the environment
    pub fn from_env() -> Result<Self> {
        let config = Self {
            throttle_delay: Duration::from_millis(
                get_env_or_default("AI_RATE_LIMIT_DELAY_MS", "1000")
                    .parse()
                    .context("Invalid AI_RATE_LIMIT_DELAY_MS")?,
            ),
            backoff_base: Duration::from_millis(
                get_env_or_default("AI_BACKOFF_BASE_MS", "2000")
                    .parse()
                    .context("Invalid AI_BACKOFF_BASE_MS")?,
            ),
            max_retries: get_env_or_default("AI_MAX_RETRIES", "3")
                .parse()
                .context("Invalid AI_MAX_RETRIES")?,
            request_timeout: Duration::from_secs(
                get_env_or_default("AI_REQUEST_TIMEOUT", "60")
                    .parse()
                    .context("Invalid AI_REQUEST_TIMEOUT")?,
            ),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration validity
    fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            anyhow::bail!("AI_MAX_RETRIES cannot be 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("AI_REQUEST_TIMEOUT cannot be 0");
        }

        Ok(())
    }
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

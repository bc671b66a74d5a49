//! Retry with exponential backoff
//!
//! Used by the adapters around single HTTP calls. Only errors that report
//! themselves as retryable are retried; everything else returns at once.
//!
//! # Example
//!
//! ```rust,ignore
//! use infrastructure::retry::{RetryConfig, retry};
//!
//! let sample = retry(&RetryConfig::default(), "forecast", || async {
//!     client.get_hourly(52.52, 13.40, 1).await
//! })
//! .await?;
//! ```

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Backoff settings for retried external calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt (default: 2, 0 disables retrying)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds (default: 200)
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Upper bound for a single delay in milliseconds (default: 2000)
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Growth factor between consecutive delays (default: 2.0)
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Random spread applied to each delay, 0.0 to 1.0 (default: 0.1)
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

const fn default_max_retries() -> u32 {
    2
}

const fn default_initial_delay() -> u64 {
    200
}

const fn default_max_delay() -> u64 {
    2_000
}

const fn default_multiplier() -> f64 {
    2.0
}

const fn default_jitter_factor() -> f64 {
    0.1
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            multiplier: default_multiplier(),
            jitter_factor: default_jitter_factor(),
        }
    }
}

impl RetryConfig {
    /// A configuration that never retries
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Same delays, without the random spread
    #[must_use]
    pub const fn without_jitter(mut self) -> Self {
        self.jitter_factor = 0.0;
        self
    }

    /// Check the values for consistency
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(format!("multiplier must be >= 1.0, got {}", self.multiplier));
        }
        if !(0.0..=1.0).contains(&self.jitter_factor) {
            return Err(format!(
                "jitter_factor must be between 0.0 and 1.0, got {}",
                self.jitter_factor
            ));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(format!(
                "initial_delay_ms ({}) exceeds max_delay_ms ({})",
                self.initial_delay_ms, self.max_delay_ms
            ));
        }
        Ok(())
    }

    /// Delay before retry number `attempt` (0-indexed)
    ///
    /// `initial_delay * multiplier^attempt`, capped at `max_delay`, then
    /// spread by up to `jitter_factor` in either direction.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(32) as i32;
        let base = (self.initial_delay_ms as f64) * self.multiplier.powi(exponent);
        let capped = base.min(self.max_delay_ms as f64);

        let delay = if self.jitter_factor > 0.0 {
            let spread = capped * self.jitter_factor;
            capped + rand::rng().random_range(-spread..=spread)
        } else {
            capped
        };

        // Non-negative and bounded by max_delay * (1 + jitter)
        Duration::from_millis(delay.max(0.0) as u64)
    }
}

/// Errors that know whether a repeat attempt may succeed
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for application::ApplicationError {
    fn is_retryable(&self) -> bool {
        Self::is_retryable(self)
    }
}

impl Retryable for integration_weather::WeatherError {
    fn is_retryable(&self) -> bool {
        Self::is_retryable(self)
    }
}

impl Retryable for integration_geocoding::GeocodingError {
    fn is_retryable(&self) -> bool {
        Self::is_retryable(self)
    }
}

/// Run `operation` until it succeeds, fails permanently, or runs out of retries
///
/// `operation_name` only labels the log lines.
pub async fn retry<F, Fut, T, E>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + std::fmt::Display,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(operation = operation_name, retries = attempt, "Succeeded after retry");
                }
                return Ok(value);
            },
            Err(err) if !err.is_retryable() => {
                debug!(operation = operation_name, error = %err, "Non-retryable failure");
                return Err(err);
            },
            Err(err) if attempt >= config.max_retries => {
                warn!(
                    operation = operation_name,
                    attempts = attempt + 1,
                    error = %err,
                    "Giving up after retries"
                );
                return Err(err);
            },
            Err(err) => {
                let delay = config.delay_for_attempt(attempt);
                #[allow(clippy::cast_possible_truncation)]
                let delay_ms = delay.as_millis() as u64;
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    delay_ms,
                    error = %err,
                    "Retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            },
        }
    }
}

//! Retry policy and the retry loop wrapped around every engine call.

use std::future::Future;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::Result;

/// Exponential backoff schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one; 1 disables retrying
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry in milliseconds (default: 100)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound for a single delay in milliseconds (default: 10000)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Growth factor between consecutive delays (default: 2.0)
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Add up to 10% random jitter to each delay
    #[serde(default = "default_jitter")]
    pub jitter: bool,

    /// Give up once this much time has passed since the first attempt
    #[serde(default)]
    pub max_elapsed_ms: Option<u64>,
}

fn default_max_attempts() -> u32 {
    4
}

fn default_base_delay_ms() -> u64 {
    100
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_jitter() -> bool {
    true
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
            jitter: default_jitter(),
            max_elapsed_ms: None,
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn exponential(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms: base_delay.as_millis() as u64,
            max_delay_ms: max_delay.as_millis() as u64,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    #[must_use]
    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed_ms = Some(max_elapsed.as_millis() as u64);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.max_attempts > 1
    }

    /// Delay to wait after the given failed attempt (1-based), before jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let delay_ms = (self.base_delay_ms as f64) * self.multiplier.max(1.0).powi(exponent);
        let capped = delay_ms.min(self.max_delay_ms as f64);
        Duration::from_millis(capped as u64)
    }

    fn delay_with_jitter(&self, attempt: u32) -> Duration {
        let delay = self.backoff(attempt);
        if !self.jitter || delay.is_zero() {
            return delay;
        }
        let jitter_ms = (delay.as_millis() as f64 * 0.1 * rand::thread_rng().gen::<f64>()) as u64;
        delay + Duration::from_millis(jitter_ms)
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or the
/// policy is exhausted. The last error is returned unchanged.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, name: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let started = Instant::now();
    let max_elapsed = policy.max_elapsed_ms.map(Duration::from_millis);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if !err.is_retryable() {
            debug!("{} failed with non-retryable {}: {}", name, err.kind(), err.message());
            return Err(err);
        }

        if attempt >= policy.max_attempts {
            if policy.is_enabled() {
                warn!("{} failed after {} attempts: {}", name, attempt, err);
            }
            return Err(err);
        }

        let delay = policy.delay_with_jitter(attempt);
        if let Some(limit) = max_elapsed {
            if started.elapsed() + delay > limit {
                warn!(
                    "{} giving up after {:?} ({} attempts): {}",
                    name,
                    started.elapsed(),
                    attempt,
                    err
                );
                return Err(err);
            }
        }

        warn!(
            "{} failed (attempt {}/{}), retrying in {:?}: {}",
            name, attempt, policy.max_attempts, delay, err
        );
        tokio::time::sleep(delay).await;
    }
}

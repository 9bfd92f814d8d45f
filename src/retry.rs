//! Bounded retry for fallible operations
//!
//! A policy runs an operation up to `attempts` times, pausing `delay`
//! between failures. The error of the final attempt is returned as-is.

use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_ATTEMPTS, DEFAULT_DELAY_MS};
use crate::platform;

/// Rejected retry configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("retry policy needs at least one attempt")]
    ZeroAttempts,

    #[error("invalid retry config: {0}")]
    Parse(String),
}

/// Serialized form of a [`RetryPolicy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total tries allowed (must be >= 1)
    pub attempts: u32,
    /// Wait between a failed attempt and the next one
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            delay_ms: DEFAULT_DELAY_MS,
        }
    }
}

/// How many times to try an operation and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RetryConfig", into = "RetryConfig")]
pub struct RetryPolicy {
    attempts: NonZeroU32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: NonZeroU32::MIN.saturating_add(DEFAULT_ATTEMPTS - 1),
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
        }
    }
}

impl TryFrom<RetryConfig> for RetryPolicy {
    type Error = PolicyError;

    fn try_from(config: RetryConfig) -> Result<Self, Self::Error> {
        Self::try_new(config.attempts, config.delay_ms)
    }
}

impl From<RetryPolicy> for RetryConfig {
    fn from(policy: RetryPolicy) -> Self {
        Self {
            attempts: policy.attempts.get(),
            delay_ms: whole_millis(policy.delay),
        }
    }
}

/// Delay in milliseconds, rounded up so a non-zero delay never becomes shorter
fn whole_millis(delay: Duration) -> u64 {
    let mut ms = delay.as_millis();
    if delay.subsec_nanos() % 1_000_000 != 0 {
        ms += 1;
    }
    u64::try_from(ms).unwrap_or(u64::MAX)
}

impl RetryPolicy {
    pub fn new(attempts: NonZeroU32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Build a policy from raw numbers, rejecting zero attempts
    pub fn try_new(attempts: u32, delay_ms: u64) -> Result<Self, PolicyError> {
        let attempts = NonZeroU32::new(attempts).ok_or(PolicyError::ZeroAttempts)?;
        Ok(Self::new(attempts, Duration::from_millis(delay_ms)))
    }

    /// Parse a policy from a JSON [`RetryConfig`]; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        let config: RetryConfig =
            serde_json::from_str(json).map_err(|e| PolicyError::Parse(e.to_string()))?;
        Self::try_from(config)
    }

    /// Set the pause between failed attempts.
    ///
    /// Sub-millisecond precision is kept at runtime, but the serialized
    /// [`RetryConfig`] rounds up to whole milliseconds.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[inline]
    pub fn attempts(&self) -> u32 {
        self.attempts.get()
    }

    #[inline]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `operation` until it succeeds or the attempts are used up.
    ///
    /// Attempts never overlap: the next call starts only after the previous
    /// future resolved and the delay (if any) elapsed. Dropping the returned
    /// future abandons the pending attempt or wait.
    ///
    /// Works on any executor. Natively, delays use the tokio timer when a
    /// tokio runtime is current and a helper thread otherwise.
    ///
    /// # Panics
    ///
    /// When polled inside a tokio runtime built without the time driver
    /// (no `enable_time`) and `delay > 0`.
    pub async fn run<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max = self.attempts.get();
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= max => {
                    log::debug!("Attempt {}/{} failed, giving up", attempt, max);
                    return Err(err);
                }
                Err(_) => {
                    log::debug!("Attempt {}/{} failed, retrying", attempt, max);
                    if !self.delay.is_zero() {
                        platform::time::sleep(self.delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Blocking variant of [`RetryPolicy::run`] for synchronous call sites
    #[cfg(not(target_arch = "wasm32"))]
    pub fn run_blocking<F, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
    {
        let max = self.attempts.get();
        let mut attempt = 1;
        loop {
            match operation() {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= max => {
                    log::debug!("Attempt {}/{} failed, giving up", attempt, max);
                    return Err(err);
                }
                Err(_) => {
                    log::debug!("Attempt {}/{} failed, retrying", attempt, max);
                    if !self.delay.is_zero() {
                        std::thread::sleep(self.delay);
                    }
                    attempt += 1;
                }
            }
        }
    }
}

/// Retry with the default policy (3 attempts, no delay)
///
/// The default policy never sleeps, so this runs on any executor.
pub async fn retry<F, Fut, T, E>(operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    RetryPolicy::default().run(operation).await
}

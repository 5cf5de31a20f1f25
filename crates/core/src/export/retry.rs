//! Retry policy for rate-limited write batches
//!
//! The writer asks the policy how long to wait before each retry and sleeps
//! through an injected [`Sleeper`], so tests can run the full retry loop
//! without real delays.

use std::time::Duration;

use async_trait::async_trait;
use rostersync_domain::config::RetrySettings;
use rostersync_domain::constants::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY_MS};

/// Delay schedule between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry
    Fixed(Duration),
    /// `base * 2^(retry - 1)`, capped at `max`
    Exponential { base: Duration, max: Duration },
}

/// Bounded retry policy: total attempts per batch plus the delay schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; never less than 1
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), backoff: Backoff::Fixed(delay) }
    }

    pub fn exponential(max_attempts: u32, base: Duration, max: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), backoff: Backoff::Exponential { base, max } }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { base, max } => {
                let shift = attempt.saturating_sub(1).min(16);
                base.saturating_mul(1 << shift).min(max)
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_RETRY_ATTEMPTS, Duration::from_millis(DEFAULT_RETRY_DELAY_MS))
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        let delay = Duration::from_millis(settings.delay_ms);
        if settings.exponential {
            Self::exponential(
                settings.max_attempts,
                delay,
                Duration::from_millis(settings.max_delay_ms),
            )
        } else {
            Self::fixed(settings.max_attempts, delay)
        }
    }
}

/// Async sleep abstraction
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

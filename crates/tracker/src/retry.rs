//! Bounded exponential-backoff retry for status polling.
//!
//! The default policy performs no retries: a status fetch that fails ends
//! the job as failed on the first fault.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Tunable parameters for retrying a failed status fetch.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first failed attempt. `0` means fail fast.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl RetryPolicy {
    /// No retries.
    pub fn fail_fast() -> Self {
        Self::default()
    }

    /// Up to `max_retries` retries with the default backoff curve.
    pub fn with_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn is_fail_fast(&self) -> bool {
        self.max_retries == 0
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Delay to wait after `current`, grown by the policy multiplier and capped
/// at [`RetryPolicy::max_delay`]. A non-finite product saturates at the cap.
pub fn next_delay(current: Duration, policy: &RetryPolicy) -> Duration {
    Duration::try_from_secs_f64(current.as_secs_f64() * policy.multiplier)
        .unwrap_or(policy.max_delay)
        .min(policy.max_delay)
}

/// Run `attempt` until it succeeds or the policy's retries are used up.
///
/// Returns the error of the last attempt once retries are exhausted.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut attempt: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut delay = policy.initial_delay;
    let mut retries = 0u32;

    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if retries < policy.max_retries => {
                retries += 1;
                tracing::warn!(
                    attempt = retries,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Attempt failed, retrying",
                );
                tokio::time::sleep(delay).await;
                delay = next_delay(delay, policy);
            }
            Err(e) => return Err(e),
        }
    }
}

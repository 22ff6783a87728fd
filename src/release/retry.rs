//! Bounded retry with a fixed delay.

use crate::error::{Result, RetryError};
use std::future::Future;
use std::time::Duration;

/// Upper bound accepted for `max_attempts`
pub const MAX_ATTEMPTS_LIMIT: u32 = 20;

/// Upper bound accepted for the delay between attempts
pub const MAX_DELAY: Duration = Duration::from_secs(300);

/// How many times to try, and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Fixed wait between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Policy with explicit values, clamped to the supported range
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.clamp(1, MAX_ATTEMPTS_LIMIT),
            delay: delay.min(MAX_DELAY),
        }
    }

    /// Single attempt, no waiting
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

/// Call `operation` until it yields a value `accept` approves or the policy's
/// attempts run out.
///
/// Errors and rejected values are both retried. The operation receives the
/// 1-based attempt number.
pub async fn retry_until<T, F, Fut, P>(
    policy: RetryPolicy,
    operation_name: &str,
    mut operation: F,
    accept: P,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&T) -> bool,
    T: std::fmt::Debug,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_failure = String::from("no attempt made");

    for attempt in 1..=max_attempts {
        match operation(attempt).await {
            Ok(value) if accept(&value) => {
                if attempt > 1 {
                    log::info!("{operation_name} succeeded on attempt {attempt}/{max_attempts}");
                }
                return Ok(value);
            }
            Ok(value) => last_failure = format!("not ready (got {value:?})"),
            Err(e) => last_failure = e.to_string(),
        }

        if attempt < max_attempts {
            log::warn!(
                "{operation_name} attempt {attempt}/{max_attempts} failed: {last_failure}; retrying in {:.1}s",
                policy.delay.as_secs_f64()
            );
            tokio::time::sleep(policy.delay).await;
        }
    }

    Err(RetryError::Exhausted {
        operation: operation_name.to_string(),
        attempts: max_attempts,
        last_failure,
    }
    .into())
}

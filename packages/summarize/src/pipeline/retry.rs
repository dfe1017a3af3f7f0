//! Bounded retry with uniform jitter.
//!
//! The wrapper never lets an error or a panic escape: every call ends in a
//! [`RetryOutcome`].

use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::{error, info, warn};

use crate::error::Panicked;
use crate::types::config::RetryPolicy;

/// Terminal result of a retried operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T, E> {
    Ok(T),
    /// Every allowed attempt failed, or the last error was not retryable.
    Exhausted { attempts: u32, last_error: E },
}

impl<T, E> RetryOutcome<T, E> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Exhausted { last_error, .. } => Err(last_error),
        }
    }
}

/// Retry `op` on any error.
///
/// `op` receives the 1-based attempt number.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, op: F) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display + From<Panicked>,
{
    retry_if(policy, op, |_| true).await
}

/// Retry `op` only while `should_retry` accepts the error.
///
/// A rejected error ends the loop immediately. Between attempts the task
/// sleeps a fresh uniform draw from `[min_delay, max_delay]`.
pub async fn retry_if<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    mut op: F,
    should_retry: P,
) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display + From<Panicked>,
    P: Fn(&E) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let result = match AssertUnwindSafe(op(attempt)).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(E::from(Panicked::from_payload(payload))),
        };

        let err = match result {
            Ok(value) => return RetryOutcome::Ok(value),
            Err(err) => err,
        };

        if attempt >= max_attempts || !should_retry(&err) {
            error!(attempt, max_attempts, error = %err, "giving up");
            return RetryOutcome::Exhausted {
                attempts: attempt,
                last_error: err,
            };
        }

        warn!(attempt, max_attempts, error = %err, "attempt failed");
        let delay = policy.jitter();
        info!(attempt, delay_ms = delay.as_millis() as u64, "retrying after jitter");
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

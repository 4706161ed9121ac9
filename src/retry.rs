//! Fixed-delay retry for the bulk detail fetch.
//!
//! Every error is retried the same way: no backoff growth, no jitter, no
//! error-type discrimination. A success short-circuits the remaining attempts.

use crate::error::{PubmedError, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

/// Attempt budget and pause between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (values below 1 count as 1)
    pub max_attempts: u32,
    /// Pause after each failed attempt except the last
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

/// Run `operation` until it succeeds or the policy's attempts are used up.
///
/// The closure receives the 1-based attempt number. Exhaustion is reported as
/// [`PubmedError::RetryExhausted`] carrying the last error.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts => {
                warn!(
                    attempt,
                    max_attempts,
                    network = e.is_network(),
                    error = %e,
                    delay_secs = policy.delay.as_secs_f64(),
                    "Retrying after error"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => {
                error!(attempts = attempt, error = %e, "Failed after multiple attempts");
                return Err(PubmedError::RetryExhausted {
                    attempts: attempt,
                    last_error: Box::new(e),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tokio::time::Instant;

    fn flaky(calls: &Cell<u32>, failures: u32) -> impl FnMut(u32) -> std::future::Ready<Result<&'static str>> + '_ {
        move |_attempt| {
            calls.set(calls.get() + 1);
            let result = if calls.get() <= failures {
                Err(PubmedError::Parse("incomplete read".to_string()))
            } else {
                Ok("records")
            };
            std::future::ready(result)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_twice_then_succeeds() {
        let policy = RetryPolicy::default();
        let calls = Cell::new(0);
        let started = Instant::now();

        let result = with_retry(&policy, flaky(&calls, 2)).await;

        assert_eq!(result.ok(), Some("records"));
        assert_eq!(calls.get(), 3);
        // Exactly two 5s pauses
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(10) && elapsed < Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_has_no_delay() {
        let calls = Cell::new(0);
        let started = Instant::now();

        let result = with_retry(&RetryPolicy::default(), flaky(&calls, 0)).await;

        assert!(result.is_ok());
        assert_eq!(calls.get(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_after_three_attempts() {
        let calls = Cell::new(0);
        let started = Instant::now();

        let result = with_retry(&RetryPolicy::default(), flaky(&calls, u32::MAX)).await;

        match result {
            Err(PubmedError::RetryExhausted { attempts, last_error }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last_error, PubmedError::Parse(_)));
            }
            other => panic!("expected RetryExhausted, got {:?}", other),
        }
        assert_eq!(calls.get(), 3);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(10) && elapsed < Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let policy = RetryPolicy {
            max_attempts: 0,
            delay: Duration::ZERO,
        };
        let calls = Cell::new(0);

        let result = with_retry(&policy, flaky(&calls, u32::MAX)).await;

        assert!(matches!(result, Err(PubmedError::RetryExhausted { attempts: 1, .. })));
        assert_eq!(calls.get(), 1);
    }
}

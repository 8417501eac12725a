//! RetryableTransfer - Bounded-Retry Artifact Delivery
//!
//! ## Responsibilities
//!
//! - Generic retry wrapper for delivering an artifact to an external
//!   endpoint: up to 3 attempts, fixed 2 s delay between attempts
//! - Application-reported failures and transport failures retry identically
//! - Exhaustion surfaces as a structured outcome carrying the last error,
//!   never as a propagated error
//!
//! Delivery clients live in [`slack`] (chat) and [`storage`] (object
//! storage).

pub mod slack;
pub mod storage;

use crate::Result;
use std::future::Future;
use std::time::Duration;

/// Retry policy. Defaults are fixed by contract; tests inject smaller
/// values.
#[derive(Debug, Clone, Copy)]
pub struct TransferPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for TransferPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// Outcome of one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Pending,
    Success,
    Failure,
}

/// Per-attempt record. Created per transfer call, discarded after the
/// terminal outcome; never persisted.
#[derive(Debug, Clone)]
pub struct TransferAttempt {
    pub attempt_number: u32,
    pub outcome: AttemptOutcome,
}

/// Terminal result of a transfer. Callers inspect this; there is no
/// control-flow interruption on failure.
#[derive(Debug)]
pub enum TransferOutcome<T> {
    Success { value: T, attempts: u32 },
    Failure { attempts: u32, last_error: String },
}

impl<T> TransferOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, TransferOutcome::Success { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            TransferOutcome::Success { attempts, .. } => *attempts,
            TransferOutcome::Failure { attempts, .. } => *attempts,
        }
    }
}

/// Run a transfer operation under the retry policy. The operation is
/// invoked with the 1-based attempt number and rebuilt per attempt; the
/// caller blocks for up to `(max_attempts - 1) * delay` between attempts
/// with no mid-retry cancellation.
pub async fn deliver<T, F, Fut>(policy: TransferPolicy, mut op: F) -> TransferOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = String::from("no attempts made");

    for number in 1..=policy.max_attempts {
        if number > 1 {
            tokio::time::sleep(policy.delay).await;
        }

        let mut attempt = TransferAttempt {
            attempt_number: number,
            outcome: AttemptOutcome::Pending,
        };

        match op(number).await {
            Ok(value) => {
                attempt.outcome = AttemptOutcome::Success;
                tracing::debug!(attempt = attempt.attempt_number, "Transfer succeeded");
                return TransferOutcome::Success {
                    value,
                    attempts: number,
                };
            }
            Err(e) => {
                attempt.outcome = AttemptOutcome::Failure;
                tracing::warn!(
                    attempt = attempt.attempt_number,
                    max_attempts = policy.max_attempts,
                    error = %e,
                    "Transfer attempt failed"
                );
                last_error = e.to_string();
            }
        }
    }

    TransferOutcome::Failure {
        attempts: policy.max_attempts,
        last_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    fn fast_policy() -> TransferPolicy {
        TransferPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(30),
        }
    }

    #[tokio::test]
    async fn test_all_failures_exhaust_exactly_three_attempts() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let outcome: TransferOutcome<()> = deliver(fast_policy(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::Api("endpoint rejected".to_string())) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match outcome {
            TransferOutcome::Failure {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("endpoint rejected"));
            }
            TransferOutcome::Success { .. } => panic!("expected failure"),
        }
        // two inter-attempt delays
        assert!(started.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_success_on_second_attempt() {
        let outcome = deliver(fast_policy(), |attempt| async move {
            if attempt < 2 {
                Err(Error::Api("transient".to_string()))
            } else {
                Ok(attempt)
            }
        })
        .await;

        match outcome {
            TransferOutcome::Success { value, attempts } => {
                assert_eq!(value, 2);
                assert_eq!(attempts, 2);
            }
            TransferOutcome::Failure { .. } => panic!("expected success"),
        }
    }

    #[tokio::test]
    async fn test_immediate_success_sleeps_never() {
        let started = Instant::now();
        let outcome = deliver(fast_policy(), |_| async { Ok(42u32) }).await;
        assert!(outcome.is_success());
        assert_eq!(outcome.attempts(), 1);
        assert!(started.elapsed() < Duration::from_millis(30));
    }
}

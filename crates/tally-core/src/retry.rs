//! Retry policy around the judgment call.
//!
//! One explicit state machine per task: attempt, decode, classify, then
//! back off or give up. Transient failures are a property of the remote
//! side and must not abort the whole batch; permanent failures must not be
//! retried, to bound total run time.

use std::time::Duration;

use tracing::warn;

use crate::errors::ProviderError;
use crate::judge;
use crate::model::Judgment;
use crate::providers::LlmClient;

/// Named retry knobs. Defaults: 3 attempts, 30 s linear step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempt budget per task, first try included.
    pub max_attempts: u32,
    /// Linear backoff step: the n-th transient failure sleeps
    /// `backoff_step * n` before the next attempt.
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Sleep before the next attempt, after `failed` transient failures.
    pub fn backoff_for(&self, failed: u32) -> Duration {
        self.backoff_step * failed
    }
}

/// Where a task ended up once the controller is done with it.
#[derive(Debug)]
pub enum TaskResolution {
    /// Valid parse within budget.
    Judged { judgment: Judgment, attempts: u32 },
    /// Permanent failure, or budget exhausted while still transient.
    Abandoned { error: ProviderError, attempts: u32 },
}

/// Drives one task to resolution against a client.
#[derive(Debug, Clone)]
pub struct RetryController {
    policy: RetryPolicy,
}

impl RetryController {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// The attempt loop. No sleep after the final failed attempt: budget
    /// exhaustion under the defaults costs 30s + 60s of backoff, then the
    /// task is abandoned.
    pub async fn run_task(
        &self,
        client: &dyn LlmClient,
        system: &str,
        user: &str,
    ) -> TaskResolution {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let result = match client.complete(system, user).await {
                Ok(raw) => judge::extract_judgment(&raw),
                Err(e) => Err(e),
            };

            match result {
                Ok(judgment) => return TaskResolution::Judged { judgment, attempts },
                Err(e) if e.is_transient() && attempts < self.policy.max_attempts => {
                    let backoff = self.policy.backoff_for(attempts);
                    warn!(
                        error = %e,
                        attempt = attempts,
                        max_attempts = self.policy.max_attempts,
                        backoff_ms = backoff.as_millis(),
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(error) => return TaskResolution::Abandoned { error, attempts },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::FakeClient;
    use std::time::Instant;

    const PAYLOAD: &str = r#"{"is_consistent": true, "justification": "ok"}"#;

    fn quick_policy(max_attempts: u32, step_ms: u64) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            backoff_step: Duration::from_millis(step_ms),
        }
    }

    #[test]
    fn backoff_scales_linearly() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for(1), Duration::from_secs(30));
        assert_eq!(policy.backoff_for(2), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn first_try_success_makes_one_call() {
        let client = FakeClient::new().with_response(PAYLOAD);
        let controller = RetryController::new(quick_policy(3, 10));

        match controller.run_task(&client, "s", "u").await {
            TaskResolution::Judged { judgment, attempts } => {
                assert_eq!(judgment.is_consistent, Some(true));
                assert_eq!(attempts, 1);
            }
            other => panic!("expected Judged, got {other:?}"),
        }
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn transient_failures_retry_until_success() {
        let client = FakeClient::new()
            .with_error(ProviderError::Timeout)
            .with_error(ProviderError::Server {
                status: Some(503),
                message: "unavailable".into(),
            })
            .with_response(PAYLOAD);
        let controller = RetryController::new(quick_policy(3, 5));

        let start = Instant::now();
        let resolution = controller.run_task(&client, "s", "u").await;
        let elapsed = start.elapsed();

        match resolution {
            TaskResolution::Judged { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("expected Judged, got {other:?}"),
        }
        // Two backoffs: step*1 + step*2.
        assert!(elapsed >= Duration::from_millis(15), "elapsed {elapsed:?}");
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn budget_exhaustion_abandons_after_exact_backoff_sum() {
        // Script only the budgeted failures: a fourth call would hit the
        // canned Ok fallback and flip the outcome, so Abandoned proves the
        // call count.
        let client = FakeClient::new()
            .with_error(ProviderError::Timeout)
            .with_error(ProviderError::Timeout)
            .with_error(ProviderError::Timeout);
        let controller = RetryController::new(quick_policy(3, 10));

        let start = Instant::now();
        let resolution = controller.run_task(&client, "s", "u").await;
        let elapsed = start.elapsed();

        match resolution {
            TaskResolution::Abandoned { error, attempts } => {
                assert!(matches!(error, ProviderError::Timeout));
                assert_eq!(attempts, 3);
            }
            other => panic!("expected Abandoned, got {other:?}"),
        }
        assert_eq!(client.calls(), 3);
        // step*1 + step*2, and none after the final failure.
        assert!(elapsed >= Duration::from_millis(30), "elapsed {elapsed:?}");
    }

    #[tokio::test]
    async fn permanent_failure_stops_immediately() {
        let client = FakeClient::new().with_error(ProviderError::Unauthorized {
            message: "invalid key".into(),
        });
        // A large step would make an accidental sleep obvious.
        let controller = RetryController::new(quick_policy(3, 5_000));

        let start = Instant::now();
        let resolution = controller.run_task(&client, "s", "u").await;

        match resolution {
            TaskResolution::Abandoned { error, attempts } => {
                assert!(matches!(error, ProviderError::Unauthorized { .. }));
                assert_eq!(attempts, 1);
            }
            other => panic!("expected Abandoned, got {other:?}"),
        }
        assert_eq!(client.calls(), 1);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn unparseable_response_is_permanent() {
        let client = FakeClient::new().with_response("the entry seems fine");
        let controller = RetryController::new(quick_policy(3, 5_000));

        match controller.run_task(&client, "s", "u").await {
            TaskResolution::Abandoned { error, attempts } => {
                assert!(matches!(error, ProviderError::Protocol { .. }));
                assert_eq!(attempts, 1);
            }
            other => panic!("expected Abandoned, got {other:?}"),
        }
        assert_eq!(client.calls(), 1);
    }
}

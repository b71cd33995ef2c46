// Path: crates/engine/src/retry.rs
//! Bounded exponential backoff for transient node failures.

use ecopoints_telemetry::ledger_metrics;
use ecopoints_types::config::RetryConfig;
use ecopoints_types::error::NodeError;
use std::future::Future;
use std::time::Duration;

/// How often and how patiently a node call is repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    /// A policy making at most `max_attempts` attempts in total (at least one).
    pub fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff: max_backoff.max(initial_backoff),
        }
    }

    /// Builds the policy from the `[retry]` config section.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.initial_backoff_ms),
            Duration::from_millis(config.max_backoff_ms),
        )
    }

    /// The total number of attempts, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// The pause after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Runs `op` until it succeeds, fails non-transiently, or the attempts
    /// are exhausted. The last error is returned.
    pub async fn run<T, F, Fut>(&self, method: &'static str, mut op: F) -> Result<T, NodeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, NodeError>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    let pause = self.backoff(attempt);
                    tracing::warn!(
                        target: "rpc",
                        method,
                        attempt,
                        max_attempts = self.max_attempts,
                        backoff_ms = pause.as_millis() as u64,
                        error = %e,
                        "Transient node error, retrying"
                    );
                    ledger_metrics().inc_node_retry(method);
                    tokio::time::sleep(pause).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1), Duration::from_millis(4))
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let p = RetryPolicy::new(10, Duration::from_millis(250), Duration::from_secs(8));
        assert_eq!(p.backoff(1), Duration::from_millis(250));
        assert_eq!(p.backoff(2), Duration::from_millis(500));
        assert_eq!(p.backoff(3), Duration::from_secs(1));
        assert_eq!(p.backoff(7), Duration::from_secs(8));
        assert_eq!(p.backoff(64), Duration::from_secs(8));
        assert_eq!(RetryPolicy::new(0, Duration::ZERO, Duration::ZERO).max_attempts(), 1);
    }

    #[tokio::test]
    async fn test_run_stops_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = policy(4)
            .run("eth_chainId", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(NodeError::Transport("refused".into()))
            })
            .await;
        assert!(matches!(result, Err(NodeError::Transport(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_run_does_not_retry_permanent_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = policy(4)
            .run("eth_sendRawTransaction", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(NodeError::Rpc {
                    code: -32000,
                    message: "insufficient funds for gas * price + value".into(),
                })
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_recovers_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let result = policy(3)
            .run("eth_chainId", || async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(NodeError::Http {
                        status: 502,
                        body: String::new(),
                    })
                } else {
                    Ok(1337u64)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 1337);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}

//! Retry with bounded exponential backoff
//!
//! Used for catalog page fetches and bib record fetches. Schema validation and
//! transforms are deterministic and never go through here.

use crate::error::Transient;
use std::time::Duration;

/// Retry budget for one external call
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff: Duration::from_millis(initial_backoff_ms),
            ..Default::default()
        }
    }
}

/// Run `operation` until it succeeds, fails permanently, or attempts run out.
///
/// **Algorithm:**
/// 1. Attempt operation
/// 2. On success, return result
/// 3. On a transient error with attempts left: log WARN, sleep, double backoff
/// 4. Otherwise return the last error unchanged
pub async fn retry_transient<F, Fut, T, E>(
    operation_name: &str,
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Transient + std::fmt::Display,
{
    let mut attempt = 0;
    let mut backoff = policy.initial_backoff;

    loop {
        attempt += 1;

        if attempt > 1 {
            tracing::debug!(operation = operation_name, attempt, "Retrying request");
        }

        match operation().await {
            Ok(result) => return Ok(result),
            Err(err) => {
                if !err.is_transient() {
                    return Err(err);
                }

                if attempt >= policy.max_attempts {
                    tracing::error!(
                        operation = operation_name,
                        attempt,
                        error = %err,
                        "Request failed: retries exhausted"
                    );
                    return Err(err);
                }

                let wait = backoff.min(policy.max_backoff);
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    backoff_ms = wait.as_millis() as u64,
                    error = %err,
                    "Transient failure, will retry after backoff"
                );

                tokio::time::sleep(wait).await;
                backoff = (backoff * 2).min(policy.max_backoff);
            }
        }
    }
}

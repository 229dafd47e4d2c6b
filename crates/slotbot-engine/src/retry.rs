//! Bounded retry combinator.
//!
//! One retry policy instead of nested try/catch chains: an operation, a
//! fault classifier deciding which errors are worth another attempt, a
//! reset hook run between attempts, and a hard attempt cap. The worker
//! manager applies it at its boundary with the
//! session-destroying reset; nothing else in the engine retries whole
//! operations.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Attempt budget and pause between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// The worker boundary policy: the failed operation is retried exactly
    /// once against a fresh session.
    pub fn once_more() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_millis(0),
        }
    }
}

/// Run `operation` until it succeeds, the classifier rejects the error, or
/// the attempt budget is spent. `reset` runs before each re-attempt.
pub async fn bounded<T, E, Op, OpFut, Classify, Reset, ResetFut>(
    policy: RetryPolicy,
    mut operation: Op,
    classify: Classify,
    mut reset: Reset,
) -> Result<T, E>
where
    E: std::fmt::Display,
    Op: FnMut() -> OpFut,
    OpFut: Future<Output = Result<T, E>>,
    Classify: Fn(&E) -> bool,
    Reset: FnMut() -> ResetFut,
    ResetFut: Future<Output = ()>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_attempts && classify(&e) => {
                warn!("attempt {attempt} failed ({e}), resetting and retrying");
                reset().await;
                if !policy.backoff.is_zero() {
                    tokio::time::sleep(policy.backoff).await;
                }
            }
            Err(e) => return Err(e),
        }
    }
}

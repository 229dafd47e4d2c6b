//! Polling primitives: wait-until-condition over a remote, asynchronously
//! mutating document.
//!
//! Every primitive takes a caller-supplied timeout; there is no global
//! timeout constant. The poll interval is small and fixed so latency stays
//! low without hammering the remote. All failures surface as
//! [`EngineError::Timeout`] naming the thing waited for; errors from the
//! probe itself pass through untouched.

use std::future::Future;
use std::time::Duration;

use slotbot_protocols::EngineError;
use tokio::time::Instant;

/// Fixed tick between predicate checks.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Timeout plus tick for one wait.
#[derive(Debug, Clone, Copy)]
pub struct Poll {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Poll {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            interval: POLL_INTERVAL,
        }
    }

    pub fn with_interval(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

/// Wait until `probe` yields a value.
pub async fn wait_present<T, F, Fut>(what: &str, poll: Poll, mut probe: F) -> Result<T, EngineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, EngineError>>,
{
    let deadline = Instant::now() + poll.timeout;
    loop {
        if let Some(value) = probe().await? {
            return Ok(value);
        }
        if Instant::now() >= deadline {
            return Err(EngineError::timeout(what));
        }
        tokio::time::sleep(poll.interval).await;
    }
}

/// Wait until `predicate` reports true.
pub async fn wait_for<F, Fut>(what: &str, poll: Poll, mut predicate: F) -> Result<(), EngineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, EngineError>>,
{
    wait_present(what, poll, || {
        let fut = predicate();
        async move { Ok(fut.await?.then_some(())) }
    })
    .await
}

/// Wait until the serialized fragment differs from `baseline`.
pub async fn wait_changed<F, Fut>(
    what: &str,
    poll: Poll,
    baseline: &str,
    mut fragment: F,
) -> Result<String, EngineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, EngineError>>,
{
    let deadline = Instant::now() + poll.timeout;
    loop {
        let current = fragment().await?;
        if current != baseline {
            return Ok(current);
        }
        if Instant::now() >= deadline {
            return Err(EngineError::timeout(what));
        }
        tokio::time::sleep(poll.interval).await;
    }
}

/// Wait until the fragment stays byte-identical for `stable_for`.
///
/// The last-changed timestamp is compared against the stability window on
/// every tick, not only on transition edges, so a fragment that settles
/// just before the deadline is still accepted.
pub async fn wait_stable<F, Fut>(
    what: &str,
    poll: Poll,
    stable_for: Duration,
    mut fragment: F,
) -> Result<String, EngineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, EngineError>>,
{
    let deadline = Instant::now() + poll.timeout;
    let mut last: Option<String> = None;
    let mut last_change = Instant::now();

    loop {
        let current = fragment().await?;
        match &last {
            Some(prev) if *prev == current => {
                if last_change.elapsed() >= stable_for {
                    return Ok(current);
                }
            }
            _ => {
                last = Some(current);
                last_change = Instant::now();
            }
        }

        if Instant::now() >= deadline {
            return Err(EngineError::timeout(what));
        }
        tokio::time::sleep(poll.interval).await;
    }
}

/// Classified content of the observed fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentState {
    /// Empty, or a known loading placeholder.
    Placeholder,
    /// Real content.
    Content,
    /// The remote reported a server-side failure; waiting longer is
    /// pointless.
    RemoteError,
}

/// Wait until the fragment is either real content or an explicit remote
/// error — the error branch exists so stabilization does not spin through
/// the full timeout when the remote has already failed.
pub async fn wait_content_or_error<F, Fut>(
    what: &str,
    poll: Poll,
    mut state: F,
) -> Result<ContentState, EngineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ContentState, EngineError>>,
{
    wait_present(what, poll, || {
        let fut = state();
        async move {
            let s = fut.await?;
            Ok((s != ContentState::Placeholder).then_some(s))
        }
    })
    .await
}

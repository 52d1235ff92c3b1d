//! Status polling and per-call deadlines

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info};

use super::error::DomainError;

/// How often to poll and how long to keep trying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl WaitPolicy {
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    pub const fn from_secs(interval: u64, timeout: u64) -> Self {
        Self::new(Duration::from_secs(interval), Duration::from_secs(timeout))
    }
}

/// Result of a single status check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus<T> {
    Ready(T),
    Pending(String),
    Failed(String),
}

/// Maps a status string onto ready, failed or pending
#[derive(Debug, Clone, Copy)]
pub struct StatusTarget<'a> {
    pub ready: &'a [&'a str],
    pub failed: &'a [&'a str],
}

impl<'a> StatusTarget<'a> {
    pub const fn new(ready: &'a [&'a str], failed: &'a [&'a str]) -> Self {
        Self { ready, failed }
    }

    pub fn classify(&self, status: String) -> PollStatus<String> {
        if self.ready.contains(&status.as_str()) {
            PollStatus::Ready(status)
        } else if self.failed.contains(&status.as_str()) {
            PollStatus::Failed(status)
        } else {
            PollStatus::Pending(status)
        }
    }
}

/// Polls `check` until it reports ready, reports failure, or the policy timeout elapses.
/// Errors returned by `check` abort the wait.
pub async fn wait_for<T, F, Fut>(
    resource: &str,
    policy: WaitPolicy,
    mut check: F,
) -> Result<T, DomainError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollStatus<T>, DomainError>>,
{
    let deadline = Instant::now() + policy.timeout;

    loop {
        match check().await? {
            PollStatus::Ready(value) => return Ok(value),
            PollStatus::Failed(status) => {
                return Err(DomainError::failed(format!(
                    "{} reached status {}",
                    resource, status
                )));
            }
            PollStatus::Pending(status) => {
                info!(resource, status = %status, "Waiting");
            }
        }

        if Instant::now() + policy.interval > deadline {
            return Err(DomainError::timeout(format!(
                "{} not ready within {}s",
                resource,
                policy.timeout.as_secs()
            )));
        }

        sleep(policy.interval).await;
    }
}

/// Runs `call` with a deadline; the in-flight call is dropped when it expires
pub async fn with_deadline<T, Fut>(
    operation: &str,
    limit: Duration,
    call: Fut,
) -> Result<T, DomainError>
where
    Fut: Future<Output = Result<T, DomainError>>,
{
    match timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            debug!(operation, limit_secs = limit.as_secs(), "Deadline exceeded");
            Err(DomainError::timeout(format!(
                "{} did not finish within {}s",
                operation,
                limit.as_secs()
            )))
        }
    }
}

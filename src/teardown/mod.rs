//! Releasing long-lived resources with exponential backoff.
//!
//! Whoever owns a store calls into this module from its shutdown path. The
//! runner never does.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, warn};

/// Error types for teardown operations.
#[derive(Error, Debug)]
pub enum TeardownError {
    #[error("failed to release resource after {attempts} attempts in {elapsed:?}: {last_error}")]
    Timeout {
        attempts: u32,
        elapsed: Duration,
        last_error: String,
    },
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_deadline_ms() -> u64 {
    10_000
}

/// Backoff timings for [`release_with_backoff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackoffPolicy {
    /// Delay after the first failure; doubles on every further failure.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// No new attempt starts once this much time has passed.
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
}

impl BackoffPolicy {
    pub fn new(base_delay: Duration, deadline: Duration) -> Self {
        Self {
            base_delay_ms: u64::try_from(base_delay.as_millis()).unwrap_or(u64::MAX),
            deadline_ms: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    /// `base_delay * 2^attempt`, saturating instead of overflowing.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay().saturating_mul(factor)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            deadline_ms: default_deadline_ms(),
        }
    }
}

/// Call `release` until it succeeds or the policy's deadline passes.
///
/// After the n-th failure (counting from zero) the loop sleeps
/// `base_delay * 2^n` before trying again.
pub async fn release_with_backoff<F, Fut, E>(
    mut release: F,
    policy: &BackoffPolicy,
) -> Result<(), TeardownError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    let start = Instant::now();
    let deadline = policy.deadline();
    let mut attempt: u32 = 0;
    let mut last_error = String::from("deadline elapsed before the first attempt");

    while start.elapsed() < deadline {
        match release().await {
            Ok(()) => {
                if attempt > 0 {
                    info!(attempts = attempt + 1, "Released resource after retrying");
                }
                return Ok(());
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                warn!(attempt, error = %e, delay = ?delay, "Failed to release resource, retrying");
                last_error = e.to_string();
                attempt = attempt.saturating_add(1);
                tokio::time::sleep(delay).await;
            }
        }
    }

    Err(TeardownError::Timeout {
        attempts: attempt,
        elapsed: start.elapsed(),
        last_error,
    })
}

/// Like [`release_with_backoff`], but a timeout terminates the process.
///
/// A stuck resource in a short-lived tool is treated as unrecoverable.
pub async fn release_or_exit<F, Fut, E>(release: F, policy: &BackoffPolicy)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    if let Err(e) = release_with_backoff(release, policy).await {
        error!(error = %e, "Giving up on resource teardown");
        std::process::exit(1);
    }
}

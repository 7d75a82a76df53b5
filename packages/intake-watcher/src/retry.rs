//! Bounded retry around the unit of work.
//!
//! Every failure from [`UnitOfWork::process`] is absorbed here, logged with
//! its cause, and followed by a fixed delay before the next attempt. Only
//! when the budget is spent does the failure escalate, as
//! [`Invocation::Exhausted`]. Nothing in this module touches the watermark.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::FileEntry;
use crate::work::UnitOfWork;

/// Retry bounds for a single file: attempt count and inter-attempt delay.
///
/// Immutable once the loop is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts per file, at least 1.
    pub max_attempts: u32,
    /// Fixed sleep between a failed attempt and the next one.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1000,
            delay: Duration::from_secs(900),
        }
    }
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` is clamped up to 1.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Replace the attempt bound (clamped up to 1).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Replace the inter-attempt delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Outcome of running the unit of work against one file.
#[derive(Debug)]
pub enum Invocation {
    /// The unit of work returned `Ok` within the budget.
    Succeeded {
        /// Attempts consumed, counting the successful one.
        attempts: u32,
    },
    /// Every permitted attempt failed.
    Exhausted {
        /// Attempts consumed (equals the policy's `max_attempts`).
        attempts: u32,
        /// The failure from the final attempt.
        last_error: anyhow::Error,
    },
}

impl Invocation {
    /// Whether the file was processed.
    pub fn is_success(&self) -> bool {
        matches!(self, Invocation::Succeeded { .. })
    }
}

/// Run `work` against `entry` under `policy`.
///
/// Failed attempts are logged at WARN with the path, attempt index, and
/// cause. No sleep follows the final attempt; the spent budget is reported
/// as [`Invocation::Exhausted`] instead.
pub async fn invoke_with_retry(
    work: &dyn UnitOfWork,
    entry: &FileEntry,
    policy: &RetryPolicy,
) -> Invocation {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match work.process(&entry.path).await {
            Ok(()) => return Invocation::Succeeded { attempts: attempt },
            Err(error) => {
                warn!(
                    path = %entry.path.display(),
                    attempt,
                    max_attempts,
                    error = %format!("{error:#}"),
                    "unit of work failed"
                );
                if attempt >= max_attempts {
                    return Invocation::Exhausted {
                        attempts: max_attempts,
                        last_error: error,
                    };
                }
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}

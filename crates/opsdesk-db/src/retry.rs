//! # Write Retry
//!
//! Optimistic retries with exponential backoff for rate-limited writes.
//!
//! ## Why This Exists
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Write Retry Loop                                   │
//! │                                                                         │
//! │  store.create_order()                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  retry_write(policy, || repo.insert(...))                              │
//! │       │                                                                 │
//! │       ├── Ok → return                                                  │
//! │       │                                                                 │
//! │       ├── Err, retryable (Busy / pool exhausted)                       │
//! │       │       │                                                         │
//! │       │       ▼                                                         │
//! │       │   sleep(backoff), backoff ×2 up to max, try again              │
//! │       │                                                                 │
//! │       └── Err, non-retryable (constraint, not found) → return at once  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQLite surfaces write contention as "database is locked"; the hosted
//! backend the original system ran against surfaced the same situation as
//! a rate-limit response. Both are transient, both back off the same way.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::DbResult;

// =============================================================================
// Policy
// =============================================================================

/// Backoff policy for retryable write failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Backoff before the first retry.
    pub initial_backoff: Duration,
    /// Cap for the doubled backoff.
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// 5 attempts: 100ms, 200ms, 400ms, 800ms between them.
    pub const fn default_writes() -> Self {
        RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
        }
    }

    /// A single attempt, no retries. Used in tests.
    pub const fn no_retries() -> Self {
        RetryPolicy {
            max_attempts: 1,
            initial_backoff: Duration::from_millis(0),
            max_backoff: Duration::from_millis(0),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::default_writes()
    }
}

// =============================================================================
// Retry Loop
// =============================================================================

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// attempt budget is spent. The last error is returned unchanged.
///
/// ## Example
/// ```rust,ignore
/// let policy = RetryPolicy::default_writes();
/// retry_write(policy, "insert payment", || repo.insert(&payment)).await?;
/// ```
pub async fn retry_write<T, F, Fut>(policy: RetryPolicy, label: &str, mut op: F) -> DbResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DbResult<T>>,
{
    // A zero-attempt policy still runs the operation once
    let max_attempts = policy.max_attempts.max(1);
    let mut backoff = policy.initial_backoff;
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                warn!(
                    %label,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %err,
                    "Retryable write failure, backing off"
                );
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(policy.max_backoff);
                attempt += 1;
            }
            Err(err) => {
                debug!(%label, attempt, error = %err, "Write failed");
                return Err(err);
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

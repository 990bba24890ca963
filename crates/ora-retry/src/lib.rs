//! ORA Retry - bounded retry around arbitrary async operations
//!
//! Wraps an operation with a deterministic backoff schedule and structured
//! error classification:
//! - `delay(attempt) = min(max_delay, base_delay * 2^attempt)` when
//!   exponential backoff is enabled, else a constant `base_delay`
//! - No jitter; the schedule is fully deterministic
//! - Classification is a pure function of the error value; callers may
//!   supply a predicate that overrides the default entirely
//! - On exhaustion a single wrapping error carries the attempt count and
//!   the last underlying error; intermediate failures are only logged
//!
//! # Example
//!
//! ```rust,no_run
//! use ora_retry::{execute_with_retry, RetryPolicy};
//! use ora_domain::{Domain, ResearchError};
//!
//! # async fn example() {
//! let policy = RetryPolicy::default();
//! let result: Result<u32, _> = execute_with_retry(&policy, || async {
//!     Err::<u32, _>(ResearchError::domain(Domain::Market, "upstream flaked"))
//! })
//! .await;
//! assert!(result.is_err());
//! # }
//! ```

#![warn(unreachable_pub)]

use ora_domain::ResearchError;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Retry policy: attempt bound plus the backoff schedule parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first)
    pub max_attempts: u32,
    /// Delay before the first retry (and every retry when constant)
    pub base_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
    /// Double the delay after each failed attempt
    pub exponential: bool,
}

impl RetryPolicy {
    /// Create policy with explicit attempt bound
    #[inline]
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// With base delay
    #[inline]
    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// With max delay
    #[inline]
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// With constant (non-exponential) backoff
    #[inline]
    #[must_use]
    pub fn constant(mut self) -> Self {
        self.exponential = false;
        self
    }

    /// Delay before the retry following failed attempt `attempt`
    /// (zero-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if !self.exponential {
            return self.base_delay;
        }
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            exponential: true,
        }
    }
}

/// Default classification hook: structured errors decide their own
/// recoverability.
pub trait Retryable {
    /// Whether the operation may be attempted again
    fn is_retryable(&self) -> bool;
}

impl Retryable for ResearchError {
    #[inline]
    fn is_retryable(&self) -> bool {
        ResearchError::is_retryable(self)
    }
}

/// Terminal outcome of a retried operation
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E: Display> {
    /// Every allowed attempt failed; carries only the last error
    #[error("retries exhausted after {attempts} attempts: {last}")]
    Exhausted {
        /// Attempts made
        attempts: u32,
        /// Last underlying error
        last: E,
    },

    /// The error was classified non-retryable on first sight
    #[error("non-retryable: {0}")]
    Fatal(E),
}

impl<E: Display> RetryError<E> {
    /// Recover the underlying error
    #[inline]
    pub fn into_inner(self) -> E {
        match self {
            Self::Exhausted { last, .. } | Self::Fatal(last) => last,
        }
    }
}

/// Retry `op` under `policy` using the default classification.
///
/// # Errors
/// `RetryError::Fatal` when the error is non-retryable,
/// `RetryError::Exhausted` when the attempt budget runs out.
pub async fn execute_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    execute_with_retry_classified(policy, E::is_retryable, op).await
}

/// Retry `op` under `policy` with a caller-supplied predicate that replaces
/// the default classification entirely.
///
/// # Errors
/// Same surface as [`execute_with_retry`].
pub async fn execute_with_retry_classified<T, E, F, Fut, C>(
    policy: &RetryPolicy,
    classify: C,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> bool,
    E: Display,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(retries = attempt, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                if !classify(&err) {
                    tracing::error!(error = %err, "non-retryable error, aborting");
                    return Err(RetryError::Fatal(err));
                }
                attempt += 1;
                tracing::warn!(attempt, error = %err, "attempt failed");
                if attempt >= policy.max_attempts {
                    tracing::error!(attempts = attempt, error = %err, "retries exhausted");
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: err,
                    });
                }
                let delay = policy.delay_for(attempt - 1);
                tracing::debug!(?delay, next_attempt = attempt + 1, "retry scheduled");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Condition polling for eventually-consistent UI state.
//!
//! A predicate is evaluated immediately and then once per poll interval until
//! it holds or the budget runs out. Query errors raised by the predicate are
//! transient: they count as "not yet true" and the loop keeps going.
//!
//! The loop never blocks past the deadline. Every evaluation is raced against
//! the remaining budget and sleeps are clamped to it, so a hung query cannot
//! stretch the wait.

use crate::result::{ProbeError, ProbeResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Default timeout for wait operations (5 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (250ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Smallest interval the poller will sleep between attempts
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// POLL RESULT
// =============================================================================

/// Result of a polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollResult {
    /// The predicate was observed true within the budget
    pub succeeded: bool,
    /// The whole budget was spent
    pub elapsed_enough: bool,
    /// Number of predicate evaluations
    pub attempts: usize,
    /// Time spent polling
    pub elapsed: Duration,
}

impl PollResult {
    fn satisfied(attempts: usize, elapsed: Duration) -> Self {
        Self {
            succeeded: true,
            elapsed_enough: false,
            attempts,
            elapsed,
        }
    }

    fn exhausted(attempts: usize, elapsed: Duration) -> Self {
        Self {
            succeeded: false,
            elapsed_enough: true,
            attempts,
            elapsed,
        }
    }

    /// Whether the poll ended on the deadline rather than on success
    #[must_use]
    pub const fn timed_out(&self) -> bool {
        !self.succeeded
    }
}

// =============================================================================
// PREDICATE OUTCOMES
// =============================================================================

/// What a predicate evaluation may produce.
///
/// Plain `bool` predicates cannot fail; `ProbeResult<bool>` predicates report
/// query failures, which the poller treats as "not yet true".
pub trait PredicateOutcome {
    /// Normalise into a fallible boolean
    fn into_outcome(self) -> ProbeResult<bool>;
}

impl PredicateOutcome for bool {
    fn into_outcome(self) -> ProbeResult<bool> {
        Ok(self)
    }
}

impl PredicateOutcome for ProbeResult<bool> {
    fn into_outcome(self) -> ProbeResult<bool> {
        self
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll a producer until it yields a value or the budget runs out.
///
/// Returns the poll statistics together with the first value produced.
pub async fn await_value<T, F, Fut>(mut producer: F, options: &WaitOptions) -> (PollResult, Option<T>)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<Option<T>>>,
{
    let start = Instant::now();
    let deadline = start + options.timeout();
    let interval = options.poll_interval().max(MIN_POLL_INTERVAL);
    let mut attempts = 0;

    loop {
        attempts += 1;
        match tokio::time::timeout_at(deadline, producer()).await {
            Ok(Ok(Some(value))) => {
                trace!(attempts, "wait condition satisfied");
                return (PollResult::satisfied(attempts, start.elapsed()), Some(value));
            }
            Ok(Ok(None)) => {}
            Ok(Err(error)) => debug!(attempts, %error, "transient query failure"),
            Err(_) => debug!(attempts, "predicate evaluation cut off at deadline"),
        }

        let now = Instant::now();
        if now >= deadline {
            debug!(
                attempts,
                timeout_ms = options.timeout_ms,
                "wait condition not met before deadline"
            );
            return (PollResult::exhausted(attempts, start.elapsed()), None);
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

/// Poll a predicate until it holds or the budget runs out.
///
/// Never reports success without observing the predicate true, and never
/// reports failure as an error: callers decide whether a timeout is fatal.
pub async fn await_condition<F, Fut, O>(mut predicate: F, options: &WaitOptions) -> PollResult
where
    F: FnMut() -> Fut,
    Fut: Future<Output = O>,
    O: PredicateOutcome,
{
    let (poll, _) = await_value(
        || {
            let evaluation = predicate();
            async move { evaluation.await.into_outcome().map(|held| held.then_some(())) }
        },
        options,
    )
    .await;
    poll
}

/// Poll a predicate and treat a timeout as fatal
pub async fn wait_until<F, Fut, O>(
    waited_for: &str,
    predicate: F,
    options: &WaitOptions,
) -> ProbeResult<PollResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = O>,
    O: PredicateOutcome,
{
    let poll = await_condition(predicate, options).await;
    if poll.succeeded {
        Ok(poll)
    } else {
        Err(ProbeError::Timeout {
            ms: options.timeout_ms,
            waited_for: waited_for.to_string(),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

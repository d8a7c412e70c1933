//! Action-then-verify workflow steps.
//!
//! A step issues one mutating action and then polls for the state change it
//! should cause:
//!
//! ```text
//! Idle -> ActionIssued -> Polling -> { Confirmed | TimedOut }
//! ```
//!
//! The action is never retried by the step. Running a step again re-enters
//! from `Idle`.

use crate::result::ProbeResult;
use crate::wait::{await_condition, PollResult, PredicateOutcome, WaitOptions};
use std::future::Future;
use tracing::{debug, info};

/// Lifecycle of a single workflow step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepState {
    /// Nothing issued yet
    Idle,
    /// The action has been sent to the UI
    ActionIssued,
    /// Waiting for the resulting state
    Polling,
    /// The expected state was observed
    Confirmed,
    /// The expected state never appeared
    TimedOut,
}

impl StepState {
    /// Whether the step has finished
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::TimedOut)
    }
}

/// A named action-then-verify step that records its transitions
#[derive(Debug, Clone)]
pub struct VerifiedStep {
    name: String,
    options: WaitOptions,
    history: Vec<StepState>,
}

impl VerifiedStep {
    /// Create a step in the `Idle` state
    #[must_use]
    pub fn new(name: impl Into<String>, options: WaitOptions) -> Self {
        Self {
            name: name.into(),
            options,
            history: vec![StepState::Idle],
        }
    }

    /// Step name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> StepState {
        self.history.last().copied().unwrap_or(StepState::Idle)
    }

    /// Every state the step has passed through
    #[must_use]
    pub fn history(&self) -> &[StepState] {
        &self.history
    }

    fn enter(&mut self, state: StepState) {
        debug!(step = %self.name, ?state, "step transition");
        self.history.push(state);
    }

    /// Issue the action once, then poll the condition.
    ///
    /// Fails only if the action itself fails; a condition that never holds
    /// ends in `TimedOut` with an unsuccessful [`PollResult`].
    pub async fn run<A, AFut, C, CFut, O>(&mut self, action: A, condition: C) -> ProbeResult<PollResult>
    where
        A: FnOnce() -> AFut,
        AFut: Future<Output = ProbeResult<()>>,
        C: FnMut() -> CFut,
        CFut: Future<Output = O>,
        O: PredicateOutcome,
    {
        if self.state() != StepState::Idle {
            self.enter(StepState::Idle);
        }

        action().await?;
        self.enter(StepState::ActionIssued);

        self.enter(StepState::Polling);
        let poll = await_condition(condition, &self.options).await;

        if poll.succeeded {
            self.enter(StepState::Confirmed);
        } else {
            info!(step = %self.name, timeout_ms = self.options.timeout_ms, "step not confirmed");
            self.enter(StepState::TimedOut);
        }
        Ok(poll)
    }
}

/// Execute `action` exactly once and poll `condition` for its effect.
///
/// Returns the poll's success flag; `Err` only if the action fails.
pub async fn act_and_verify<A, AFut, C, CFut, O>(
    action: A,
    condition: C,
    options: &WaitOptions,
) -> ProbeResult<bool>
where
    A: FnOnce() -> AFut,
    AFut: Future<Output = ProbeResult<()>>,
    C: FnMut() -> CFut,
    CFut: Future<Output = O>,
    O: PredicateOutcome,
{
    let mut step = VerifiedStep::new("act-and-verify", *options);
    Ok(step.run(action, condition).await?.succeeded)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::result::ProbeError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;

    /// A counter whose decrements land after a delay, like a backend round trip
    fn delayed_removal(count: &Arc<AtomicUsize>, delay: Duration) -> ProbeResult<()> {
        let target = Arc::clone(count);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            target.fetch_sub(1, Ordering::SeqCst);
        });
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmed_when_effect_lands() {
        let count = Arc::new(AtomicUsize::new(1));
        let opts = WaitOptions::new().with_timeout(3000).with_poll_interval(250);
        let observed = Arc::clone(&count);

        let confirmed = act_and_verify(
            || async { delayed_removal(&count, Duration::from_millis(800)) },
            move || {
                let now = observed.load(Ordering::SeqCst);
                async move { now == 0 }
            },
            &opts,
        )
        .await
        .unwrap();

        assert!(confirmed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_when_backend_never_updates() {
        let count = Arc::new(AtomicUsize::new(1));
        let observed = Arc::clone(&count);
        let opts = WaitOptions::new().with_timeout(3000).with_poll_interval(250);
        let start = Instant::now();

        let confirmed = act_and_verify(
            || async { Ok(()) },
            move || {
                let now = observed.load(Ordering::SeqCst);
                async move { now == 0 }
            },
            &opts,
        )
        .await
        .unwrap();

        assert!(!confirmed);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_removals_empty_the_cart() {
        let count = Arc::new(AtomicUsize::new(3));
        let opts = WaitOptions::new().with_timeout(5000).with_poll_interval(500);

        for expected in [2usize, 1, 0] {
            let observed = Arc::clone(&count);
            let confirmed = act_and_verify(
                || async { delayed_removal(&count, Duration::from_millis(300)) },
                move || {
                    let now = observed.load(Ordering::SeqCst);
                    async move { now == expected }
                },
                &opts,
            )
            .await
            .unwrap();
            assert!(confirmed);
        }

        let observed = Arc::clone(&count);
        let poll = await_condition(
            move || {
                let now = observed.load(Ordering::SeqCst);
                async move { now == 0 }
            },
            &opts,
        )
        .await;
        assert!(poll.succeeded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_noop_action_times_out_instead_of_hanging() {
        let count = Arc::new(AtomicUsize::new(1));
        let opts = WaitOptions::new().with_timeout(1000).with_poll_interval(100);
        let deleted = Arc::new(AtomicUsize::new(0));

        let mut outcomes = Vec::new();
        for _ in 0..2 {
            let before = count.load(Ordering::SeqCst);
            let observed = Arc::clone(&count);
            let deleted = Arc::clone(&deleted);
            let counter = Arc::clone(&count);
            let confirmed = act_and_verify(
                move || async move {
                    // deleting an already-deleted item is a no-op
                    if deleted.fetch_add(1, Ordering::SeqCst) == 0 {
                        counter.fetch_sub(1, Ordering::SeqCst);
                    }
                    Ok(())
                },
                move || {
                    let now = observed.load(Ordering::SeqCst);
                    async move { now < before }
                },
                &opts,
            )
            .await
            .unwrap();
            outcomes.push(confirmed);
        }

        assert_eq!(outcomes, vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_action_runs_once_and_condition_after_it() {
        let actions = Arc::new(AtomicUsize::new(0));
        let issued = Arc::clone(&actions);
        let seen = Arc::clone(&actions);
        let mut step = VerifiedStep::new("click delete", WaitOptions::new().with_timeout(500));

        let poll = step
            .run(
                move || async move {
                    issued.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                },
                move || {
                    let after_action = seen.load(Ordering::SeqCst) == 1;
                    async move { after_action }
                },
            )
            .await
            .unwrap();

        assert!(poll.succeeded);
        assert_eq!(actions.load(Ordering::SeqCst), 1);
        assert_eq!(
            step.history(),
            &[
                StepState::Idle,
                StepState::ActionIssued,
                StepState::Polling,
                StepState::Confirmed
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rerun_reenters_from_idle() {
        let mut step = VerifiedStep::new("noop", WaitOptions::new().with_timeout(100));
        step.run(|| async { Ok(()) }, || async { false }).await.unwrap();
        assert_eq!(step.state(), StepState::TimedOut);
        assert!(step.state().is_terminal());

        step.run(|| async { Ok(()) }, || async { true }).await.unwrap();
        assert_eq!(step.state(), StepState::Confirmed);
        assert_eq!(step.history()[4], StepState::Idle);
        assert_eq!(step.name(), "noop");
    }

    #[tokio::test(start_paused = true)]
    async fn test_action_error_propagates_without_polling() {
        let mut step = VerifiedStep::new("missing button", WaitOptions::new());
        let err = step
            .run(
                || async {
                    Err(ProbeError::ElementNotFound {
                        locator: "#delete".into(),
                    })
                },
                || async { true },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProbeError::ElementNotFound { .. }));
        assert_eq!(step.state(), StepState::Idle);
    }
}

//! Deadline properties of the condition poller, checked on a paused clock.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use std::time::Duration;
use tokio::time::Instant;
use vitrine::{await_condition, PollResult, WaitOptions};

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

/// Poll a predicate that turns true `ready_after_ms` after the start
fn poll_until_ready(ready_after_ms: u64, options: WaitOptions) -> PollResult {
    paused_runtime().block_on(async move {
        let ready_at = Instant::now() + Duration::from_millis(ready_after_ms);
        await_condition(|| async move { Instant::now() >= ready_at }, &options).await
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_never_true_spends_exactly_the_budget(timeout in 0u64..10_000, interval in 1u64..2_000) {
        let options = WaitOptions::new().with_timeout(timeout).with_poll_interval(interval);
        let poll = poll_until_ready(timeout + 1, options);
        prop_assert!(!poll.succeeded);
        prop_assert!(poll.elapsed_enough);
        prop_assert_eq!(poll.elapsed, Duration::from_millis(timeout));
        prop_assert!(poll.attempts as u64 <= timeout / interval + 2);
    }

    #[test]
    fn prop_success_iff_ready_within_budget(
        timeout in 0u64..10_000,
        interval in 1u64..2_000,
        ready in 0u64..12_000,
    ) {
        let options = WaitOptions::new().with_timeout(timeout).with_poll_interval(interval);
        let poll = poll_until_ready(ready, options);
        prop_assert_eq!(poll.succeeded, ready <= timeout);
        if poll.succeeded {
            prop_assert!(poll.elapsed >= Duration::from_millis(ready));
            prop_assert!(poll.elapsed <= Duration::from_millis(timeout));
            prop_assert!(poll.elapsed < Duration::from_millis(ready + interval));
        } else {
            prop_assert_eq!(poll.elapsed, Duration::from_millis(timeout));
        }
    }
}

#[test]
fn zero_timeout_checks_once() {
    let poll = poll_until_ready(1, WaitOptions::new().with_timeout(0));
    assert!(!poll.succeeded);
    assert_eq!(poll.attempts, 1);
    assert_eq!(poll.elapsed, Duration::ZERO);
}

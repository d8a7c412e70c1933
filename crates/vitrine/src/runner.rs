//! Suite runner: one fresh session per scenario, bounded parallelism.

use crate::config::SuiteConfig;
use crate::pages::PageContext;
use crate::reporter::{ScenarioOutcome, SuiteReport};
use crate::result::{ProbeError, ProbeResult};
use crate::scenario::{Scenario, ScenarioCatalog, ScenarioContext};
use crate::session::UiSession;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::time::Instant;
use tracing::{info, warn};

/// Opens isolated sessions, one per scenario
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Open a fresh session
    async fn open(&self) -> ProbeResult<Box<dyn UiSession>>;

    /// What the sessions run against, for reports
    fn describe(&self) -> String;
}

/// Options for a suite run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Only run scenarios whose id or title contains this
    pub filter: Option<String>,
    /// Scenarios run at the same time
    pub jobs: usize,
    /// Stop starting scenarios after the first failure
    pub fail_fast: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            filter: None,
            jobs: 1,
            fail_fast: false,
        }
    }
}

impl RunOptions {
    /// Create default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set filter
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set parallelism
    #[must_use]
    pub const fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Set fail-fast
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

/// Runs scenarios against sessions from a factory
#[derive(Debug)]
pub struct SuiteRunner<F> {
    config: SuiteConfig,
    factory: F,
}

impl<F: SessionFactory> SuiteRunner<F> {
    /// Create a runner
    #[must_use]
    pub fn new(config: SuiteConfig, factory: F) -> Self {
        Self { config, factory }
    }

    /// The suite configuration
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Give the factory back, e.g. to shut its browser down
    #[must_use]
    pub fn into_factory(self) -> F {
        self.factory
    }

    /// Run the selected scenarios of `catalog`.
    ///
    /// Outcomes are reported in catalog order. With `fail_fast`, scenarios
    /// not yet started when a failure is recorded are reported as skipped.
    pub async fn run(&self, catalog: &ScenarioCatalog, options: &RunOptions) -> SuiteReport {
        let mut report = SuiteReport::new(self.factory.describe());
        let start = Instant::now();
        let selected = catalog.select(options.filter.as_deref());
        info!(
            against = %report.target,
            scenarios = selected.len(),
            jobs = options.jobs.max(1),
            "suite started"
        );

        let stop = AtomicBool::new(false);
        let stop = &stop;
        let mut outcomes: Vec<(usize, ScenarioOutcome)> = stream::iter(selected.into_iter().enumerate())
            .map(|(index, scenario)| async move {
                if stop.load(Ordering::SeqCst) {
                    return (index, ScenarioOutcome::skipped(scenario));
                }
                let outcome = self.run_scenario(scenario).await;
                if options.fail_fast && outcome.status.is_failure() {
                    stop.store(true, Ordering::SeqCst);
                }
                (index, outcome)
            })
            .buffer_unordered(options.jobs.max(1))
            .collect()
            .await;

        outcomes.sort_by_key(|(index, _)| *index);
        report.outcomes = outcomes.into_iter().map(|(_, outcome)| outcome).collect();
        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(summary = %report.summary(), "suite finished");
        report
    }

    /// Run one scenario in a fresh session
    pub async fn run_scenario(&self, scenario: &Scenario) -> ScenarioOutcome {
        let start = Instant::now();
        let result = self.execute(scenario).await;
        let elapsed = start.elapsed();

        let outcome = match result {
            Ok(()) => ScenarioOutcome::passed(scenario, elapsed),
            Err(error) => ScenarioOutcome::from_error(scenario, elapsed, &error),
        };
        info!(
            id = scenario.id,
            status = outcome.status.label(),
            duration_ms = outcome.duration_ms,
            "scenario finished"
        );
        outcome
    }

    async fn execute(&self, scenario: &Scenario) -> ProbeResult<()> {
        let session = self.factory.open().await?;
        let ctx = ScenarioContext::new(
            PageContext::new(session.as_ref(), &self.config),
            &self.config.data,
        );
        let result = scenario.run(&ctx).await.map_err(|error| {
            if matches!(error, ProbeError::Timeout { .. }) {
                warn!(id = scenario.id, %error, "wait expired, reported as a failed expectation");
            }
            error.timeout_as_assertion()
        });
        if let Err(error) = session.close().await {
            warn!(id = scenario.id, %error, "session did not close cleanly");
        }
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::DemoStoreFactory;
    use crate::reporter::ScenarioStatus;
    use crate::wait::{wait_until, WaitOptions};
    use futures::future::BoxFuture;

    fn always_fails<'c>(_ctx: &'c ScenarioContext<'_>) -> BoxFuture<'c, ProbeResult<()>> {
        Box::pin(async { Err::<(), _>(ProbeError::assertion("expected failure")) })
    }

    fn always_passes<'c>(_ctx: &'c ScenarioContext<'_>) -> BoxFuture<'c, ProbeResult<()>> {
        Box::pin(async { Ok::<(), ProbeError>(()) })
    }

    fn modal_never_closes<'c>(_ctx: &'c ScenarioContext<'_>) -> BoxFuture<'c, ProbeResult<()>> {
        Box::pin(async {
            let opts = WaitOptions::new().with_timeout(100);
            wait_until("login form to close", || async { false }, &opts).await?;
            Ok(())
        })
    }

    fn catalog() -> ScenarioCatalog {
        let mut catalog = ScenarioCatalog::new();
        catalog.push(Scenario::new("demo.first", "passes first", always_passes));
        catalog.push(Scenario::new("demo.broken", "always fails", always_fails));
        catalog.push(Scenario::new("demo.last", "passes last", always_passes));
        catalog
    }

    fn runner() -> SuiteRunner<DemoStoreFactory> {
        let config = SuiteConfig::default();
        SuiteRunner::new(config.clone(), DemoStoreFactory::new(config))
    }

    #[derive(Debug)]
    struct Unreachable;

    #[async_trait]
    impl SessionFactory for Unreachable {
        async fn open(&self) -> ProbeResult<Box<dyn UiSession>> {
            Err(ProbeError::BrowserLaunch {
                message: "no browser".to_string(),
            })
        }

        fn describe(&self) -> String {
            "nowhere".to_string()
        }
    }

    #[test]
    fn test_run_options_builders() {
        let options = RunOptions::new().with_filter("cart").with_jobs(4).with_fail_fast(true);
        assert_eq!(options.filter.as_deref(), Some("cart"));
        assert_eq!(options.jobs, 4);
        assert!(options.fail_fast);
        assert_eq!(RunOptions::default().jobs, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_collects_all_outcomes_in_order() {
        let report = runner().run(&catalog(), &RunOptions::new().with_jobs(3)).await;
        let ids: Vec<_> = report.outcomes.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["demo.first", "demo.broken", "demo.last"]);
        assert_eq!(report.passed_count(), 2);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.target, "in-memory demo store");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_fast_skips_the_rest() {
        let report = runner()
            .run(&catalog(), &RunOptions::new().with_fail_fast(true))
            .await;
        assert_eq!(report.outcome("demo.first").unwrap().status, ScenarioStatus::Passed);
        assert_eq!(report.outcome("demo.broken").unwrap().status, ScenarioStatus::Failed);
        assert_eq!(report.outcome("demo.last").unwrap().status, ScenarioStatus::Skipped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_selects_scenarios() {
        let report = runner()
            .run(&catalog(), &RunOptions::new().with_filter("passes"))
            .await;
        assert_eq!(report.total_count(), 2);
        assert!(report.all_passed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_wait_is_a_failure() {
        let mut catalog = ScenarioCatalog::new();
        catalog.push(Scenario::new("demo.modal", "modal closes", modal_never_closes));
        let report = runner().run(&catalog, &RunOptions::new()).await;

        let outcome = report.outcome("demo.modal").unwrap();
        assert_eq!(outcome.status, ScenarioStatus::Failed);
        let error = outcome.error.as_deref().unwrap();
        assert!(error.starts_with("Assertion failed:"), "{error}");
        assert!(error.contains("login form to close"));
        assert_eq!(report.errored_count(), 0);
    }

    #[tokio::test]
    async fn test_session_failure_is_errored() {
        let runner = SuiteRunner::new(SuiteConfig::default(), Unreachable);
        let report = runner.run(&catalog(), &RunOptions::new()).await;
        assert_eq!(report.errored_count(), 3);
        let error = report.outcomes[0].error.as_deref().unwrap();
        assert!(error.contains("no browser"));
    }
}

//! Suite reports: per-scenario outcomes rendered as text, JSON, or JUnit XML.

use crate::result::{ProbeError, ProbeResult};
use crate::scenario::Scenario;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

/// How a scenario ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    /// Every check held
    Passed,
    /// A check did not hold
    Failed,
    /// The scenario could not run to completion (timeout, session error)
    Errored,
    /// Not started because the run stopped early
    Skipped,
}

impl ScenarioStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Failed or errored
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Errored)
    }

    /// Short label for text output
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Passed => "PASS",
            Self::Failed => "FAIL",
            Self::Errored => "ERROR",
            Self::Skipped => "SKIP",
        }
    }
}

/// Result of one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Scenario id
    pub id: String,
    /// Scenario title
    pub title: String,
    /// Scenario group
    pub group: String,
    /// Final status
    pub status: ScenarioStatus,
    /// Wall time spent
    pub duration_ms: u64,
    /// Error message for failed or errored scenarios
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScenarioOutcome {
    fn new(scenario: &Scenario, status: ScenarioStatus, duration: Duration) -> Self {
        Self {
            id: scenario.id.to_string(),
            title: scenario.title.to_string(),
            group: scenario.group().to_string(),
            status,
            duration_ms: duration.as_millis() as u64,
            error: None,
        }
    }

    /// A passing outcome
    #[must_use]
    pub fn passed(scenario: &Scenario, duration: Duration) -> Self {
        Self::new(scenario, ScenarioStatus::Passed, duration)
    }

    /// Outcome for a scenario that ended with `error`.
    ///
    /// Assertion failures are `Failed`; everything else is `Errored`. The
    /// runner has already restated expired waits as assertion failures.
    #[must_use]
    pub fn from_error(scenario: &Scenario, duration: Duration, error: &ProbeError) -> Self {
        let status = if error.is_assertion() {
            ScenarioStatus::Failed
        } else {
            ScenarioStatus::Errored
        };
        Self {
            error: Some(error.to_string()),
            ..Self::new(scenario, status, duration)
        }
    }

    /// A scenario that never started
    #[must_use]
    pub fn skipped(scenario: &Scenario) -> Self {
        Self::new(scenario, ScenarioStatus::Skipped, Duration::ZERO)
    }
}

/// Report for one suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Unique id of this run
    pub run_id: Uuid,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// What the scenarios ran against
    pub target: String,
    /// Wall time of the whole run
    pub duration_ms: u64,
    /// Outcomes in catalog order
    pub outcomes: Vec<ScenarioOutcome>,
}

impl SuiteReport {
    /// An empty report starting now
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            target: target.into(),
            duration_ms: 0,
            outcomes: Vec::new(),
        }
    }

    fn count(&self, status: ScenarioStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Get number of passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(ScenarioStatus::Passed)
    }

    /// Get number of failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(ScenarioStatus::Failed)
    }

    /// Get number of errored scenarios
    #[must_use]
    pub fn errored_count(&self) -> usize {
        self.count(ScenarioStatus::Errored)
    }

    /// Get number of skipped scenarios
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(ScenarioStatus::Skipped)
    }

    /// Get total scenario count
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.outcomes.len()
    }

    /// Get pass rate (0.0 to 1.0) over the scenarios that ran
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        let ran = self.total_count() - self.skipped_count();
        if ran == 0 {
            return 1.0;
        }
        self.passed_count() as f64 / ran as f64
    }

    /// No scenario failed or errored
    #[must_use]
    pub fn all_passed(&self) -> bool {
        !self.outcomes.iter().any(|o| o.status.is_failure())
    }

    /// Failed and errored outcomes
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_failure()).collect()
    }

    /// Outcome of scenario `id`
    #[must_use]
    pub fn outcome(&self, id: &str) -> Option<&ScenarioOutcome> {
        self.outcomes.iter().find(|o| o.id == id)
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{}: {}/{} passed ({:.1}%)",
            self.target,
            self.passed_count(),
            self.total_count(),
            self.pass_rate() * 100.0
        );
        for (count, what) in [
            (self.failed_count(), "failed"),
            (self.errored_count(), "errored"),
            (self.skipped_count(), "skipped"),
        ] {
            if count > 0 {
                let _ = write!(line, ", {count} {what}");
            }
        }
        line
    }

    /// Plain-text report: one line per scenario, then the summary
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for outcome in &self.outcomes {
            let _ = writeln!(
                out,
                "{:<5} {} ({} ms)",
                outcome.status.label(),
                outcome.id,
                outcome.duration_ms
            );
            if let Some(error) = &outcome.error {
                let _ = writeln!(out, "      {error}");
            }
        }
        out.push_str(&self.summary());
        out.push('\n');
        out
    }

    /// Pretty-printed JSON
    pub fn render_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render JUnit XML content
    #[must_use]
    pub fn render_junit(&self) -> String {
        let mut xml = String::new();

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        let _ = writeln!(
            xml,
            r#"<testsuite name="{}" tests="{}" failures="{}" errors="{}" skipped="{}" time="{:.3}">"#,
            escape_xml(&self.target),
            self.total_count(),
            self.failed_count(),
            self.errored_count(),
            self.skipped_count(),
            self.duration_ms as f64 / 1000.0
        );

        for outcome in &self.outcomes {
            let _ = writeln!(
                xml,
                r#"  <testcase classname="{}" name="{}" time="{:.3}">"#,
                escape_xml(&outcome.group),
                escape_xml(&outcome.title),
                outcome.duration_ms as f64 / 1000.0
            );
            let message = outcome.error.as_deref().map(escape_xml).unwrap_or_default();
            match outcome.status {
                ScenarioStatus::Failed => {
                    let _ = writeln!(xml, r#"    <failure message="{message}">{message}</failure>"#);
                }
                ScenarioStatus::Errored => {
                    let _ = writeln!(xml, r#"    <error message="{message}">{message}</error>"#);
                }
                ScenarioStatus::Skipped => xml.push_str("    <skipped/>\n"),
                ScenarioStatus::Passed => {}
            }
            xml.push_str("  </testcase>\n");
        }

        xml.push_str("</testsuite>\n");
        xml
    }

    /// Write the JUnit XML report to `path`
    pub fn write_junit(&self, path: &Path) -> ProbeResult<()> {
        std::fs::write(path, self.render_junit())?;
        Ok(())
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

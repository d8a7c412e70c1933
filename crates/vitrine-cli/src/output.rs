//! Terminal rendering of scenario lists and run reports

use console::style;
use std::fmt::Write;
use vitrine::{Scenario, ScenarioStatus, SuiteReport};

/// Renders CLI output, coloured or plain
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    /// Whether to use colors
    pub use_color: bool,
}

impl Printer {
    /// Create a printer
    #[must_use]
    pub const fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    /// Status label padded to a fixed width
    #[must_use]
    pub fn status(&self, status: ScenarioStatus) -> String {
        let label = format!("{:<5}", status.label());
        let styled = match status {
            ScenarioStatus::Passed => style(label).green(),
            ScenarioStatus::Failed | ScenarioStatus::Errored => style(label).red().bold(),
            ScenarioStatus::Skipped => style(label).yellow(),
        };
        styled.force_styling(self.use_color).to_string()
    }

    /// One line per scenario: id, then title
    #[must_use]
    pub fn scenario_list(&self, scenarios: &[&Scenario]) -> String {
        let width = scenarios.iter().map(|s| s.id.len()).max().unwrap_or(0);
        let mut out = String::new();
        for scenario in scenarios {
            let id = format!("{:<width$}", scenario.id);
            let _ = writeln!(
                out,
                "{}  {}",
                style(id).cyan().force_styling(self.use_color),
                scenario.title
            );
        }
        let _ = writeln!(out, "{} scenarios", scenarios.len());
        out
    }

    /// The text report with coloured status labels
    #[must_use]
    pub fn report(&self, report: &SuiteReport) -> String {
        let mut out = String::new();
        for outcome in &report.outcomes {
            let _ = writeln!(
                out,
                "{} {} ({} ms)",
                self.status(outcome.status),
                outcome.id,
                outcome.duration_ms
            );
            if let Some(error) = &outcome.error {
                let _ = writeln!(out, "      {}", style(error).dim().force_styling(self.use_color));
            }
        }
        let summary = if report.all_passed() {
            style(report.summary()).green().bold()
        } else {
            style(report.summary()).red().bold()
        };
        let _ = writeln!(out, "{}", summary.force_styling(self.use_color));
        out
    }
}

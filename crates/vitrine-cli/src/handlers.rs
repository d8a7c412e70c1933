//! Subcommand handlers

use crate::commands::{ListArgs, ReportFormat, RunArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::Printer;
use std::io::Write;
use tracing::info;
use vitrine::mock::DemoStoreFactory;
use vitrine::{RunOptions, ScenarioCatalog, SuiteConfig, SuiteReport, SuiteRunner};

/// Print the catalog, optionally filtered
pub fn list(args: &ListArgs, printer: Printer, out: &mut impl Write) -> CliResult<()> {
    let catalog = ScenarioCatalog::standard();
    let selected = catalog.select(args.filter.as_deref());
    out.write_all(printer.scenario_list(&selected).as_bytes())?;
    Ok(())
}

/// Print the effective suite configuration
pub fn config(config: &CliConfig, out: &mut impl Write) -> CliResult<()> {
    let suite = config.load_suite()?;
    out.write_all(suite.to_yaml()?.as_bytes())?;
    Ok(())
}

/// Run the selected scenarios and emit the report.
///
/// Fails with [`CliError::ScenariosFailed`] when any scenario did not pass.
pub async fn run(
    config: &CliConfig,
    args: &RunArgs,
    printer: Printer,
    out: &mut impl Write,
) -> CliResult<()> {
    if args.jobs == 0 {
        return Err(CliError::invalid_argument("--jobs must be at least 1"));
    }
    let mut suite = config.load_suite()?;
    if let Some(url) = &args.base_url {
        suite = suite.with_base_url(url.as_str());
        suite.validate()?;
    }

    let catalog = ScenarioCatalog::standard();
    if let Some(filter) = &args.filter {
        if catalog.select(Some(filter.as_str())).is_empty() {
            return Err(CliError::invalid_argument(format!(
                "no scenario matches {filter:?}"
            )));
        }
    }
    let options = RunOptions {
        filter: args.filter.clone(),
        jobs: args.jobs,
        fail_fast: args.fail_fast,
    };

    let report = if args.mock {
        let factory = DemoStoreFactory::new(suite.clone());
        SuiteRunner::new(suite, factory).run(&catalog, &options).await
    } else {
        run_live(suite, args, &catalog, &options).await?
    };

    emit(&report, args, config, printer, out)?;
    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::ScenariosFailed {
            failed: report.total_count() - report.passed_count(),
            total: report.total_count(),
        })
    }
}

#[cfg(feature = "browser")]
async fn run_live(
    suite: SuiteConfig,
    args: &RunArgs,
    catalog: &ScenarioCatalog,
    options: &RunOptions,
) -> CliResult<SuiteReport> {
    use vitrine::cdp::{CdpSessionFactory, LaunchOptions};

    let mut launch = LaunchOptions::default().with_headless(!args.headed);
    if args.no_sandbox {
        launch = launch.with_no_sandbox();
    }
    if let Some(path) = &args.chromium {
        launch = launch.with_chromium_path(path.as_str());
    }
    let factory = CdpSessionFactory::launch(launch).await?;
    let runner = SuiteRunner::new(suite, factory);
    let report = runner.run(catalog, options).await;
    if let Err(error) = runner.into_factory().shutdown().await {
        tracing::warn!(%error, "browser did not shut down cleanly");
    }
    Ok(report)
}

#[cfg(not(feature = "browser"))]
async fn run_live(
    _suite: SuiteConfig,
    _args: &RunArgs,
    _catalog: &ScenarioCatalog,
    _options: &RunOptions,
) -> CliResult<SuiteReport> {
    Err(CliError::invalid_argument(
        "this build has no browser support; pass --mock or rebuild with --features browser",
    ))
}

fn emit(
    report: &SuiteReport,
    args: &RunArgs,
    config: &CliConfig,
    printer: Printer,
    out: &mut impl Write,
) -> CliResult<()> {
    let rendered = match (args.format, &args.output) {
        (ReportFormat::Text, None) => printer.report(report),
        (ReportFormat::Text, Some(_)) => report.render_text(),
        (ReportFormat::Json, _) => report.render_json()?,
        (ReportFormat::Junit, _) => report.render_junit(),
    };
    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            info!(path = %path.display(), "report written");
            if !config.verbosity.is_quiet() {
                writeln!(out, "{}", report.summary())?;
            }
        }
        None => out.write_all(rendered.as_bytes())?,
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::{Cli, Commands};
    use clap::Parser;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["vitrine", "run"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Run(args) => args,
            other => panic!("expected Run command, got {other:?}"),
        }
    }

    async fn run_to_string(argv: &[&str]) -> (CliResult<()>, String) {
        let mut out = Vec::new();
        let result = run(&CliConfig::new(), &run_args(argv), Printer::new(false), &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_list_filters() {
        let mut out = Vec::new();
        let args = ListArgs {
            filter: Some("cart.".to_string()),
        };
        list(&args, Printer::new(false), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("cart.persist_after_refresh"));
        assert!(!text.contains("login."));
        assert!(text.ends_with("6 scenarios\n"));
    }

    #[test]
    fn test_config_prints_yaml() {
        let mut out = Vec::new();
        config(&CliConfig::new(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let parsed = SuiteConfig::from_yaml_str(&text).unwrap();
        assert_eq!(parsed.base_url, vitrine::DEFAULT_BASE_URL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_run_prints_text_report() {
        let (result, text) = run_to_string(&["--mock", "--filter", "login."]).await;
        assert!(result.is_ok(), "{text}");
        assert!(text.contains("PASS  login.valid_credentials"));
        assert!(text.contains("6/6 passed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_run_as_json() {
        let (result, text) =
            run_to_string(&["--mock", "--filter", "login.logout", "--format", "json"]).await;
        assert!(result.is_ok());
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["outcomes"][0]["id"], "login.logout");
        assert_eq!(json["outcomes"][0]["status"], "passed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_junit_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xml");
        let path_arg = path.to_str().unwrap();
        let (result, text) = run_to_string(&[
            "--mock",
            "--filter",
            "login.close_modal",
            "--format",
            "junit",
            "--output",
            path_arg,
        ])
        .await;
        assert!(result.is_ok());
        assert!(text.contains("1/1 passed"));
        let xml = std::fs::read_to_string(&path).unwrap();
        assert!(xml.contains("<testsuite"));
        assert!(xml.contains(r#"classname="login""#));
        assert!(xml.contains("should close login modal when clicking close button"));
    }

    #[tokio::test]
    async fn test_unknown_filter_is_a_usage_error() {
        let (result, _) = run_to_string(&["--mock", "--filter", "checkout"]).await;
        let err = result.unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument { .. }));
        assert!(err.to_string().contains("checkout"));
    }

    #[tokio::test]
    async fn test_zero_jobs_is_rejected() {
        let (result, _) = run_to_string(&["--mock", "-j", "0"]).await;
        assert!(matches!(result, Err(CliError::InvalidArgument { .. })));
    }

    #[tokio::test]
    async fn test_bad_base_url_is_rejected() {
        let (result, _) = run_to_string(&["--mock", "--base-url", "demoblaze.com"]).await;
        assert!(matches!(result, Err(CliError::Probe(_))));
    }

    #[cfg(not(feature = "browser"))]
    #[tokio::test]
    async fn test_live_run_needs_browser_feature() {
        let (result, _) = run_to_string(&["--filter", "login."]).await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("--mock"));
    }
}

//! Vitrine CLI library
//!
//! Command-line interface for listing and running the Vitrine scenario
//! catalog against a live browser or the in-memory demo store.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{Cli, ColorArg, Commands, ListArgs, ReportFormat, RunArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::Printer;

/// Build the CLI configuration from parsed arguments
#[must_use]
pub fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_count(cli.quiet, cli.verbose))
        .with_color(cli.color.into())
        .with_suite_file(cli.config.clone())
}

/// Dispatch the parsed command, writing to stdout
pub fn run(cli: &Cli, config: &CliConfig) -> CliResult<()> {
    let printer = Printer::new(config.color.should_color());
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match &cli.command {
        Commands::List(args) => handlers::list(args, printer, &mut out),
        Commands::Config => handlers::config(config, &mut out),
        Commands::Run(args) => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(handlers::run(config, args, printer, &mut out))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_build_config_from_flags() {
        let cli = Cli::parse_from(["vitrine", "-vv", "--color", "never", "--config", "a.yaml", "config"]);
        let config = build_config(&cli);
        assert_eq!(config.verbosity, Verbosity::Debug);
        assert_eq!(config.color, ColorChoice::Never);
        assert_eq!(config.suite_file, Some(PathBuf::from("a.yaml")));
    }

    #[test]
    fn test_quiet_wins_over_verbose() {
        let cli = Cli::parse_from(["vitrine", "-q", "-v", "list"]);
        assert!(build_config(&cli).verbosity.is_quiet());
    }
}

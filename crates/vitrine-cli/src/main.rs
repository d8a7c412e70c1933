//! Vitrine CLI entry point

use clap::Parser;
use std::process::ExitCode;
use vitrine_cli::{build_config, logging, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    logging::init(config.verbosity, config.color.should_color());

    match vitrine_cli::run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

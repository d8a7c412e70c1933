//! CLI configuration

use crate::error::CliResult;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vitrine::SuiteConfig;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - errors only
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - per-scenario progress
    Verbose,
    /// Debug - every poll attempt
    Debug,
}

impl Verbosity {
    /// Map a `-v` count
    #[must_use]
    pub const fn from_count(quiet: bool, count: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match count {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }

    /// Check if debug mode
    #[must_use]
    pub const fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }

    /// Default log filter when `RUST_LOG` is unset
    #[must_use]
    pub const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::IsTerminal::is_terminal(&std::io::stdout()),
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// Suite configuration file
    pub suite_file: Option<PathBuf>,
}

impl CliConfig {
    /// Create a new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set the suite configuration file
    #[must_use]
    pub fn with_suite_file(mut self, path: Option<PathBuf>) -> Self {
        self.suite_file = path;
        self
    }

    /// The effective suite configuration: the file if given, else defaults,
    /// then credential overrides from the environment
    pub fn load_suite(&self) -> CliResult<SuiteConfig> {
        let config = match &self.suite_file {
            Some(path) => SuiteConfig::load(path)?,
            None => SuiteConfig::default(),
        };
        Ok(config.with_env_overrides())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    mod verbosity_tests {
        use super::*;

        #[test]
        fn test_from_count() {
            assert_eq!(Verbosity::from_count(false, 0), Verbosity::Normal);
            assert_eq!(Verbosity::from_count(false, 1), Verbosity::Verbose);
            assert_eq!(Verbosity::from_count(false, 5), Verbosity::Debug);
            assert_eq!(Verbosity::from_count(true, 3), Verbosity::Quiet);
        }

        #[test]
        fn test_predicates() {
            assert!(Verbosity::Quiet.is_quiet());
            assert!(!Verbosity::Normal.is_verbose());
            assert!(Verbosity::Debug.is_verbose());
            assert!(Verbosity::Debug.is_debug());
        }

        #[test]
        fn test_log_filter() {
            assert_eq!(Verbosity::Normal.log_filter(), "warn");
            assert_eq!(Verbosity::Debug.log_filter(), "debug");
        }
    }

    mod color_tests {
        use super::*;

        #[test]
        fn test_explicit_choices() {
            assert!(ColorChoice::Always.should_color());
            assert!(!ColorChoice::Never.should_color());
        }
    }

    mod suite_tests {
        use super::*;

        #[test]
        fn test_no_file_is_default() {
            let config = CliConfig::new().load_suite().unwrap();
            assert_eq!(config.base_url, vitrine::DEFAULT_BASE_URL);
        }

        #[test]
        fn test_file_is_loaded() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "base_url: http://localhost:8080").unwrap();
            let config = CliConfig::new()
                .with_suite_file(Some(file.path().to_path_buf()))
                .load_suite()
                .unwrap();
            assert_eq!(config.base_url, "http://localhost:8080");
        }

        #[test]
        fn test_invalid_file_is_an_error() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "base_url: ftp://nowhere").unwrap();
            let result = CliConfig::new()
                .with_suite_file(Some(file.path().to_path_buf()))
                .load_suite();
            assert!(result.is_err());
        }
    }
}

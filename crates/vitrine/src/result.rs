//! Result and error types for Vitrine.

use thiserror::Error;

/// Result type for Vitrine operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving a UI session
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Operation timed out
    #[error("Operation timed out after {ms}ms: {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was being waited for
        waited_for: String,
    },

    /// No element matched the locator
    #[error("No element matches {locator}")]
    ElementNotFound {
        /// Rendered locator
        locator: String,
    },

    /// A single-element action matched more than one element
    #[error("Strict mode violation: {locator} matched {count} elements")]
    StrictModeViolation {
        /// Rendered locator
        locator: String,
        /// Number of matches
        count: usize,
    },

    /// Element went away while it was being queried
    #[error("Element detached during query: {locator}")]
    ElementDetached {
        /// Rendered locator
        locator: String,
    },

    /// Scenario expectation not met
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Session-level failure (script evaluation, protocol error)
    #[error("Session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Unsupported signal for this session
    #[error("Session cannot deliver {kind} signals")]
    UnsupportedSignal {
        /// Signal kind
        kind: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProbeError {
    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a session error
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Query failures that may clear up on a later attempt
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. } | Self::ElementDetached { .. }
        )
    }

    /// Restate an expired wait as a failed expectation.
    ///
    /// Other errors are returned unchanged.
    #[must_use]
    pub fn timeout_as_assertion(self) -> Self {
        match self {
            Self::Timeout { ms, waited_for } => Self::AssertionFailed {
                message: format!("expected {waited_for} within {ms}ms"),
            },
            other => other,
        }
    }

    /// Whether this is a scenario-level expectation failure
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionFailed { .. })
    }
}

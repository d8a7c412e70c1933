//! Suite configuration loaded from YAML.
//!
//! Every field has a default, so an empty file (or no file) describes a run
//! against the public demo store.

use crate::data::TestData;
use crate::result::{ProbeError, ProbeResult};
use crate::selectors::SelectorMap;
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default store address
pub const DEFAULT_BASE_URL: &str = "https://www.demoblaze.com";

/// Named wait budgets, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitSettings {
    /// Interval between condition checks
    pub poll_interval_ms: u64,
    /// Actionability wait before a click or fill
    pub action_ms: u64,
    /// "Is the user logged in" visibility check
    pub visibility_ms: u64,
    /// Login confirmation (error alert or welcome banner)
    pub login_ms: u64,
    /// Alert after adding a product
    pub alert_ms: u64,
    /// Products appearing after a category click
    pub catalog_ms: u64,
    /// Cart rows appearing after opening the cart
    pub cart_rows_ms: u64,
    /// A cart row disappearing after delete
    pub deletion_ms: u64,
    /// Page loads and modals opening
    pub navigation_ms: u64,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            action_ms: 5_000,
            visibility_ms: 3_000,
            login_ms: 10_000,
            alert_ms: 10_000,
            catalog_ms: 5_000,
            cart_rows_ms: 5_000,
            deletion_ms: 5_000,
            navigation_ms: 15_000,
        }
    }
}

impl WaitSettings {
    fn options(&self, timeout_ms: u64) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(timeout_ms)
            .with_poll_interval(self.poll_interval_ms)
    }

    /// Actionability budget
    #[must_use]
    pub fn action(&self) -> WaitOptions {
        self.options(self.action_ms)
    }

    /// Logged-in check budget
    #[must_use]
    pub fn visibility(&self) -> WaitOptions {
        self.options(self.visibility_ms)
    }

    /// Login confirmation budget
    #[must_use]
    pub fn login(&self) -> WaitOptions {
        self.options(self.login_ms)
    }

    /// Alert capture budget
    #[must_use]
    pub const fn alert(&self) -> Duration {
        Duration::from_millis(self.alert_ms)
    }

    /// Catalog refresh budget
    #[must_use]
    pub fn catalog(&self) -> WaitOptions {
        self.options(self.catalog_ms)
    }

    /// Cart rows budget
    #[must_use]
    pub fn cart_rows(&self) -> WaitOptions {
        self.options(self.cart_rows_ms)
    }

    /// Deletion confirmation budget
    #[must_use]
    pub fn deletion(&self) -> WaitOptions {
        self.options(self.deletion_ms)
    }

    /// Navigation budget
    #[must_use]
    pub fn navigation(&self) -> WaitOptions {
        self.options(self.navigation_ms)
    }
}

/// Configuration for a suite run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Store address, without trailing slash
    pub base_url: String,
    /// Page selectors
    pub selectors: SelectorMap,
    /// Wait budgets
    pub waits: WaitSettings,
    /// Accounts and products
    pub data: TestData,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            selectors: SelectorMap::default(),
            waits: WaitSettings::default(),
            data: TestData::default(),
        }
    }
}

impl SuiteConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml_ng::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Apply credential overrides from the environment
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        self.data = self.data.with_env_overrides();
        self
    }

    /// Replace the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Check values serde cannot
    pub fn validate(&self) -> ProbeResult<()> {
        let url = self.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ProbeError::Config {
                message: format!("base_url must be an http(s) URL, got {url:?}"),
            });
        }
        if self.waits.poll_interval_ms == 0 {
            return Err(ProbeError::Config {
                message: "waits.poll_interval_ms must be positive".to_string(),
            });
        }
        Ok(())
    }
}

//! Vitrine: page-object end-to-end suite for the demoblaze web shop.
//!
//! UI state is eventually consistent: product listings, cart rows and login
//! results arrive some time after the action that caused them. Everything in
//! this crate is built on three waiting primitives:
//!
//! - [`wait`]: poll a predicate until it holds or a deadline passes.
//! - [`signal`]: arm a one-shot listener, trigger an action, and capture the
//!   signal (usually an alert) within a bounded wait.
//! - [`step`]: run an action, then require that a verifying predicate holds.
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌─────────────┐   ┌──────────────────┐
//! │ Scenarios  │──►│ Page       │──►│ ElementRef  │──►│ UiSession        │
//! │ (catalog)  │   │ objects    │   │ (auto-wait) │   │ CDP | DemoStore  │
//! └────────────┘   └────────────┘   └─────────────┘   └──────────────────┘
//! ```
//!
//! The [`runner`] opens one isolated session per scenario through a
//! [`SessionFactory`]; [`mock::DemoStoreFactory`] serves an in-memory model of
//! the shop, and `cdp::CdpSessionFactory` (feature `browser`) drives Chromium.

#![warn(missing_docs)]

#[cfg(feature = "browser")]
pub mod cdp;
pub mod config;
pub mod data;
pub mod dialog;
pub mod locator;
pub mod mock;
pub mod pages;
pub mod reporter;
pub mod result;
pub mod runner;
pub mod scenario;
pub mod selectors;
pub mod session;
pub mod signal;
pub mod step;
pub mod wait;

pub use config::{SuiteConfig, WaitSettings, DEFAULT_BASE_URL};
pub use data::{Category, Credentials, ProductRef, TestData};
pub use dialog::{AutoDialogBehavior, Dialog, DialogAction, DialogLog, DialogType};
pub use locator::{AriaRole, Locator, Selector, SelectorTemplate};
pub use reporter::{ScenarioOutcome, ScenarioStatus, SuiteReport};
pub use result::{ProbeError, ProbeResult};
pub use runner::{RunOptions, SessionFactory, SuiteRunner};
pub use scenario::{Scenario, ScenarioCatalog, ScenarioContext};
pub use selectors::SelectorMap;
pub use session::{ElementRef, UiSession};
pub use signal::{capture_during, capture_event, ArmedSignal, CapturedEvent, SignalKind};
pub use step::{act_and_verify, StepState, VerifiedStep};
pub use wait::{await_condition, await_value, wait_until, PollResult, WaitOptions};

/// Prelude for writing scenarios
pub mod prelude {
    pub use super::pages::{
        AddToCartOutcome, BasePage, CartItem, CartPage, HomePage, LoginOutcome, LoginPage,
        PageContext, ProductDetails, ProductPage,
    };
    pub use super::{
        Category, Credentials, ProbeError, ProbeResult, ProductRef, Scenario, ScenarioCatalog,
        ScenarioContext, Selector, SuiteConfig, TestData, UiSession, WaitOptions,
    };
}

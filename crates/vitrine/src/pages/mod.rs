//! Page objects for the store.
//!
//! Every page object is a thin, copyable facade over a [`PageContext`]: the
//! session, the selector map, and the wait budgets. There is no ambient
//! "current page"; callers build the page they need from the context.

mod base;
mod cart;
mod home;
mod login;
mod product;

pub use base::BasePage;
pub use cart::{CartItem, CartPage};
pub use home::HomePage;
pub use login::{LoginOutcome, LoginPage};
pub use product::{AddToCartOutcome, ProductDetails, ProductPage};

use crate::config::{SuiteConfig, WaitSettings};
use crate::locator::Selector;
use crate::selectors::SelectorMap;
use crate::session::{ElementRef, UiSession};

/// Everything a page object needs to drive one session
#[derive(Clone, Copy)]
pub struct PageContext<'a> {
    /// The session being driven
    pub session: &'a dyn UiSession,
    /// Selectors for every page
    pub selectors: &'a SelectorMap,
    /// Wait budgets
    pub waits: WaitSettings,
    /// Store address
    pub base_url: &'a str,
}

impl<'a> PageContext<'a> {
    /// Build a context from a suite configuration
    #[must_use]
    pub fn new(session: &'a dyn UiSession, config: &'a SuiteConfig) -> Self {
        Self {
            session,
            selectors: &config.selectors,
            waits: config.waits,
            base_url: &config.base_url,
        }
    }

    /// Auto-waiting handle using the configured action budget
    #[must_use]
    pub fn element(&self, selector: &Selector) -> ElementRef<'a> {
        ElementRef::new(self.session, selector.clone().into())
            .with_action_timeout(self.waits.action())
    }

    /// Absolute URL for a path on the store
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Shared navigation and session operations
    #[must_use]
    pub fn base(&self) -> BasePage<'a> {
        BasePage::new(*self)
    }

    /// Home page
    #[must_use]
    pub fn home(&self) -> HomePage<'a> {
        HomePage::new(*self)
    }

    /// Login modal
    #[must_use]
    pub fn login(&self) -> LoginPage<'a> {
        LoginPage::new(*self)
    }

    /// Product page
    #[must_use]
    pub fn product(&self) -> ProductPage<'a> {
        ProductPage::new(*self)
    }

    /// Cart page
    #[must_use]
    pub fn cart(&self) -> CartPage<'a> {
        CartPage::new(*self)
    }
}

impl std::fmt::Debug for PageContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageContext")
            .field("base_url", &self.base_url)
            .field("waits", &self.waits)
            .finish_non_exhaustive()
    }
}

/// Digits of a price label as a number.
///
/// `"$360 *includes tax"` is 360. `None` if there are no digits or the value
/// does not fit.
#[must_use]
pub fn parse_price(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

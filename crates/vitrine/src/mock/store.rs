//! In-memory model of the demo shop.
//!
//! The model answers the selectors of a [`SelectorMap`], so it follows the
//! same configuration the page objects use. Timing mirrors the live site:
//! product listings and cart rows arrive a moment after navigation, and
//! server round trips (login, add to cart, delete) complete asynchronously.

use super::{MockApp, MockElement, MockReaction, MockSession};
use crate::config::SuiteConfig;
use crate::data::Category;
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use crate::runner::SessionFactory;
use crate::selectors::SelectorMap;
use crate::session::UiSession;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const LISTING_DELAY: Duration = Duration::from_millis(300);
const CART_ROWS_DELAY: Duration = Duration::from_millis(400);
const ROUND_TRIP: Duration = Duration::from_millis(300);
const MODAL_FADE: Duration = Duration::from_millis(150);

/// Products shown on the landing page before a category is chosen
const LANDING_PAGE_SIZE: usize = 9;

/// Faults injected into the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreFaults {
    /// Added to every asynchronous response
    pub extra_latency: Duration,
    /// Delete clicks are accepted but never remove the row
    pub ignore_deletes: bool,
    /// Adding to cart succeeds without the confirmation alert
    pub silent_add: bool,
    /// Number of initial queries that fail as if the element detached
    pub transient_failures: usize,
}

impl StoreFaults {
    /// No faults
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Slow every asynchronous response by `latency`
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.extra_latency = latency;
        self
    }

    /// Ignore delete clicks
    #[must_use]
    pub const fn with_ignored_deletes(mut self) -> Self {
        self.ignore_deletes = true;
        self
    }

    /// Suppress the add-to-cart alert
    #[must_use]
    pub const fn with_silent_add(mut self) -> Self {
        self.silent_add = true;
        self
    }

    /// Fail the first `count` queries
    #[must_use]
    pub const fn with_transient_failures(mut self, count: usize) -> Self {
        self.transient_failures = count;
        self
    }
}

/// A product in the store catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogProduct {
    /// Product id (`prod.html?idp_=<id>`)
    pub id: u32,
    /// Display name
    pub name: String,
    /// Category
    pub category: Category,
    /// Price in dollars
    pub price: u64,
    /// Description paragraph
    pub description: String,
}

fn demo_catalog() -> Vec<CatalogProduct> {
    use Category::{Laptops, Monitors, Phones};
    [
        (1, "Samsung galaxy s6", Phones, 360),
        (2, "Nokia lumia 1520", Phones, 820),
        (3, "Nexus 6", Phones, 650),
        (4, "Samsung galaxy s7", Phones, 800),
        (5, "Iphone 6 32gb", Phones, 790),
        (6, "Sony xperia z5", Phones, 320),
        (7, "HTC One M9", Phones, 700),
        (8, "Sony vaio i5", Laptops, 790),
        (9, "Sony vaio i7", Laptops, 790),
        (10, "Apple monitor 24", Monitors, 400),
        (11, "MacBook air", Laptops, 700),
        (12, "Dell i7 8gb", Laptops, 700),
        (13, "2017 Dell 15.6 Inch", Laptops, 700),
        (14, "ASUS Full HD", Monitors, 230),
        (15, "MacBook Pro", Laptops, 1100),
    ]
    .into_iter()
    .map(|(id, name, category, price)| CatalogProduct {
        id,
        name: name.to_string(),
        category,
        price,
        description: format!("{name}: product description."),
    })
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    /// `None` while the product listing is loading
    Home { listing: Option<Option<Category>> },
    Product(u32),
    /// `loaded` once the rows have been fetched
    Cart { loaded: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CartEntry {
    id: u64,
    product: u32,
}

/// Simulated demo shop
#[derive(Debug)]
pub struct DemoStore {
    selectors: SelectorMap,
    faults: StoreFaults,
    failures_left: AtomicUsize,
    catalog: Vec<CatalogProduct>,
    accounts: HashMap<String, String>,
    view: View,
    generation: u64,
    login_modal: bool,
    sign_up_modal: bool,
    username_input: String,
    password_input: String,
    user: Option<String>,
    cart: Vec<CartEntry>,
    next_entry: u64,
}

impl DemoStore {
    /// A store answering `selectors`, showing the landing page
    #[must_use]
    pub fn new(selectors: SelectorMap) -> Self {
        Self {
            selectors,
            faults: StoreFaults::none(),
            failures_left: AtomicUsize::new(0),
            catalog: demo_catalog(),
            accounts: HashMap::new(),
            view: View::Home {
                listing: Some(None),
            },
            generation: 0,
            login_modal: false,
            sign_up_modal: false,
            username_input: String::new(),
            password_input: String::new(),
            user: None,
            cart: Vec::new(),
            next_entry: 1,
        }
    }

    /// A store for a suite configuration, with its valid user registered
    #[must_use]
    pub fn from_config(config: &SuiteConfig) -> Self {
        let user = &config.data.valid_user;
        Self::new(config.selectors.clone()).with_account(&user.username, &user.password)
    }

    /// Register an account
    #[must_use]
    pub fn with_account(mut self, username: &str, password: &str) -> Self {
        self.accounts
            .insert(username.to_string(), password.to_string());
        self
    }

    /// Inject faults
    #[must_use]
    pub fn with_faults(mut self, faults: StoreFaults) -> Self {
        self.failures_left = AtomicUsize::new(faults.transient_failures);
        self.faults = faults;
        self
    }

    /// Wrap in a session
    #[must_use]
    pub fn into_session(self) -> MockSession<Self> {
        MockSession::new(self)
    }

    /// The catalog
    #[must_use]
    pub fn catalog(&self) -> &[CatalogProduct] {
        &self.catalog
    }

    /// Look up a product by exact name
    #[must_use]
    pub fn product_by_name(&self, name: &str) -> Option<&CatalogProduct> {
        self.catalog.iter().find(|p| p.name == name)
    }

    /// Names of the products in the cart, oldest first
    #[must_use]
    pub fn cart_names(&self) -> Vec<String> {
        self.cart
            .iter()
            .filter_map(|e| self.product(e.product))
            .map(|p| p.name.clone())
            .collect()
    }

    /// The logged-in user
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    fn product(&self, id: u32) -> Option<&CatalogProduct> {
        self.catalog.iter().find(|p| p.id == id)
    }

    fn latency(&self, base: Duration) -> Duration {
        base + self.faults.extra_latency
    }

    fn take_failure(&self) -> bool {
        self.failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    fn leave_page(&mut self) -> u64 {
        self.generation += 1;
        self.login_modal = false;
        self.sign_up_modal = false;
        self.username_input.clear();
        self.password_input.clear();
        self.generation
    }

    fn enter_home(&mut self) -> Vec<MockReaction<Self>> {
        let generation = self.leave_page();
        self.view = View::Home { listing: None };
        vec![self.load_listing(generation, None)]
    }

    fn load_listing(&self, generation: u64, category: Option<Category>) -> MockReaction<Self> {
        MockReaction::after(self.latency(LISTING_DELAY), move |store: &mut Self| {
            if store.generation == generation {
                store.view = View::Home {
                    listing: Some(category),
                };
            }
            Vec::new()
        })
    }

    fn enter_cart(&mut self) -> Vec<MockReaction<Self>> {
        let generation = self.leave_page();
        self.view = View::Cart { loaded: false };
        vec![MockReaction::after(
            self.latency(CART_ROWS_DELAY),
            move |store: &mut Self| {
                if store.generation == generation {
                    store.view = View::Cart { loaded: true };
                }
                Vec::new()
            },
        )]
    }

    fn enter_product(&mut self, id: u32) -> ProbeResult<Vec<MockReaction<Self>>> {
        if self.product(id).is_none() {
            return Err(ProbeError::Navigation {
                url: format!("prod.html?idp_={id}"),
                message: "no such product".to_string(),
            });
        }
        self.leave_page();
        self.view = View::Product(id);
        Ok(Vec::new())
    }

    fn submit_login(&mut self, username: &str, password: &str) -> Vec<MockReaction<Self>> {
        if username.is_empty() || password.is_empty() {
            return vec![MockReaction::alert("Please fill out Username and Password.")];
        }
        match self.accounts.get(username) {
            None => vec![MockReaction::alert("User does not exist.")],
            Some(expected) if expected != password => vec![MockReaction::alert("Wrong password.")],
            Some(_) => {
                self.user = Some(username.to_string());
                self.enter_home()
            }
        }
    }

    // =========================================================================
    // RENDERING
    // =========================================================================

    fn listed(&self, filter: Option<Category>) -> Vec<&CatalogProduct> {
        match filter {
            Some(category) => self
                .catalog
                .iter()
                .filter(|p| p.category == category)
                .collect(),
            None => self.catalog.iter().take(LANDING_PAGE_SIZE).collect(),
        }
    }

    fn cart_total(&self) -> u64 {
        self.cart
            .iter()
            .filter_map(|e| self.product(e.product))
            .map(|p| p.price)
            .sum()
    }

    fn root_elements(&self) -> Vec<(Selector, MockElement)> {
        let nav = &self.selectors.nav;
        let login = &self.selectors.login;
        let guest = self.user.is_none();
        let welcome = self
            .user
            .as_ref()
            .map(|u| format!("Welcome {u}"))
            .unwrap_or_default();
        let login_link = MockElement::with_visibility("nav.login", "Log in", guest);

        let mut out = vec![
            (nav.home.clone(), MockElement::shown("nav.home", "Home")),
            (nav.cart.clone(), MockElement::shown("nav.cart", "Cart")),
            (nav.login.clone(), login_link.clone()),
            (login.open.clone(), login_link),
            (
                nav.sign_up.clone(),
                MockElement::with_visibility("nav.sign_up", "Sign up", guest),
            ),
            (
                nav.logout.clone(),
                MockElement::with_visibility("nav.logout", "Log out", !guest),
            ),
            (
                nav.welcome_user.clone(),
                MockElement::with_visibility("nav.welcome", welcome, !guest),
            ),
            (
                nav.login_modal.clone(),
                MockElement::with_visibility("modal.login", "Log in", self.login_modal),
            ),
            (
                login.username.clone(),
                MockElement::with_visibility("login.username", self.username_input.clone(), self.login_modal),
            ),
            (
                login.password.clone(),
                MockElement::with_visibility("login.password", "", self.login_modal),
            ),
            (
                login.submit.clone(),
                MockElement::with_visibility("login.submit", "Log in", self.login_modal),
            ),
            (
                login.close.clone(),
                MockElement::with_visibility("login.close", "Close", self.login_modal),
            ),
            (
                nav.sign_up_modal.clone(),
                MockElement::with_visibility("modal.sign_up", "Sign up", self.sign_up_modal),
            ),
        ];

        match self.view {
            View::Home { listing } => self.render_home(listing, &mut out),
            View::Product(id) => self.render_product(id, &mut out),
            View::Cart { loaded } => self.render_cart(loaded, &mut out),
        }
        out
    }

    fn render_home(&self, listing: Option<Option<Category>>, out: &mut Vec<(Selector, MockElement)>) {
        let home = &self.selectors.home;
        out.push((home.carousel.clone(), MockElement::shown("home.carousel", "")));
        for category in Category::ALL {
            out.push((
                home.category.render(category.label()),
                MockElement::shown(format!("home.category.{category}"), category.label()),
            ));
        }
        if let Some(filter) = listing {
            for product in self.listed(filter) {
                out.push((
                    home.product_cards.clone(),
                    MockElement::shown(
                        format!("home.card.{}", product.id),
                        format!("{} ${}", product.name, product.price),
                    ),
                ));
                out.push((
                    home.product_link.render(&product.name),
                    MockElement::shown(format!("home.product.{}", product.id), product.name.clone()),
                ));
            }
        }
    }

    fn render_product(&self, id: u32, out: &mut Vec<(Selector, MockElement)>) {
        let Some(product) = self.product(id) else {
            return;
        };
        let page = &self.selectors.product;
        out.push((page.title.clone(), MockElement::shown("product.title", product.name.clone())));
        out.push((
            page.description.clone(),
            MockElement::shown("product.description", product.description.clone()),
        ));
        out.push((
            page.price.clone(),
            MockElement::shown("product.price", format!("${} *includes tax", product.price)),
        ));
        out.push((page.add_to_cart.clone(), MockElement::shown("product.add", "Add to cart")));
    }

    fn render_cart(&self, loaded: bool, out: &mut Vec<(Selector, MockElement)>) {
        let cart = &self.selectors.cart;
        let total = if loaded && !self.cart.is_empty() {
            self.cart_total().to_string()
        } else {
            String::new()
        };
        out.push((cart.total.clone(), MockElement::shown("cart.total", total)));
        if !loaded {
            return;
        }
        for entry in &self.cart {
            let Some(product) = self.product(entry.product) else {
                continue;
            };
            out.push((
                cart.rows.clone(),
                MockElement::shown(
                    format!("cart.row.{}", entry.id),
                    format!("{} {} Delete", product.name, product.price),
                ),
            ));
            out.push((
                cart.delete.clone(),
                MockElement::shown(format!("cart.delete.{}", entry.id), "Delete"),
            ));
        }
    }

    fn scoped_elements(&self, scope: &str) -> Vec<(Selector, MockElement)> {
        let Some(entry_id) = scope
            .strip_prefix("cart.row.")
            .and_then(|id| id.parse::<u64>().ok())
        else {
            return Vec::new();
        };
        let Some(product) = self
            .cart
            .iter()
            .find(|e| e.id == entry_id)
            .and_then(|e| self.product(e.product))
        else {
            return Vec::new();
        };
        let cart = &self.selectors.cart;
        vec![
            (
                cart.row_title.clone(),
                MockElement::shown(format!("{scope}.title"), product.name.clone()),
            ),
            (
                cart.row_price.clone(),
                MockElement::shown(format!("{scope}.price"), product.price.to_string()),
            ),
            (
                cart.delete.clone(),
                MockElement::shown(format!("cart.delete.{entry_id}"), "Delete"),
            ),
        ]
    }
}

/// Path and query of a URL, `/` if it has none
fn path_of(url: &str) -> &str {
    match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("/", |i| &rest[i..]),
        None => url,
    }
}

impl MockApp for DemoStore {
    fn query(&self, scope: Option<&str>, selector: &Selector) -> ProbeResult<Vec<MockElement>> {
        if self.take_failure() {
            return Err(ProbeError::ElementDetached {
                locator: selector.to_string(),
            });
        }
        let candidates = match scope {
            None => self.root_elements(),
            Some(key) => self.scoped_elements(key),
        };
        let mut seen = HashSet::new();
        Ok(candidates
            .into_iter()
            .filter(|(s, _)| s == selector)
            .map(|(_, e)| e)
            .filter(|e| seen.insert(e.key.clone()))
            .collect())
    }

    fn click(&mut self, key: &str) -> ProbeResult<Vec<MockReaction<Self>>> {
        let round_trip = self.latency(ROUND_TRIP);
        let reactions = match key {
            "nav.home" => self.enter_home(),
            "nav.cart" => self.enter_cart(),
            "nav.login" => vec![MockReaction::after(MODAL_FADE, |store: &mut Self| {
                store.login_modal = true;
                Vec::new()
            })],
            "nav.sign_up" => vec![MockReaction::after(MODAL_FADE, |store: &mut Self| {
                store.sign_up_modal = true;
                Vec::new()
            })],
            "nav.logout" => {
                self.user = None;
                self.enter_home()
            }
            "login.submit" => {
                let username = self.username_input.clone();
                let password = self.password_input.clone();
                vec![MockReaction::after(round_trip, move |store: &mut Self| {
                    store.submit_login(&username, &password)
                })]
            }
            "login.close" => vec![MockReaction::after(MODAL_FADE, |store: &mut Self| {
                store.login_modal = false;
                Vec::new()
            })],
            "product.add" => {
                let View::Product(product) = self.view else {
                    return Ok(Vec::new());
                };
                let silent = self.faults.silent_add;
                vec![MockReaction::after(round_trip, move |store: &mut Self| {
                    let id = store.next_entry;
                    store.next_entry += 1;
                    store.cart.push(CartEntry { id, product });
                    if silent {
                        Vec::new()
                    } else {
                        vec![MockReaction::alert("Product added.")]
                    }
                })]
            }
            other => {
                if let Some(label) = other.strip_prefix("home.category.") {
                    let category = Category::ALL
                        .into_iter()
                        .find(|c| c.label() == label)
                        .ok_or_else(|| ProbeError::session(format!("unknown category {label}")))?;
                    self.generation += 1;
                    self.view = View::Home { listing: None };
                    vec![self.load_listing(self.generation, Some(category))]
                } else if let Some(id) = other.strip_prefix("home.product.") {
                    let id = id
                        .parse()
                        .map_err(|_| ProbeError::session(format!("bad product key {other}")))?;
                    self.enter_product(id)?
                } else if let Some(entry) = other.strip_prefix("cart.delete.") {
                    let entry: u64 = entry
                        .parse()
                        .map_err(|_| ProbeError::session(format!("bad cart key {other}")))?;
                    if self.faults.ignore_deletes {
                        Vec::new()
                    } else {
                        vec![MockReaction::after(round_trip, move |store: &mut Self| {
                            store.cart.retain(|e| e.id != entry);
                            Vec::new()
                        })]
                    }
                } else {
                    Vec::new()
                }
            }
        };
        Ok(reactions)
    }

    fn fill(&mut self, key: &str, value: &str) -> ProbeResult<()> {
        match key {
            "login.username" => self.username_input = value.to_string(),
            "login.password" => self.password_input = value.to_string(),
            other => return Err(ProbeError::session(format!("{other} is not an input"))),
        }
        Ok(())
    }

    fn navigate(&mut self, url: &str) -> ProbeResult<Vec<MockReaction<Self>>> {
        let path = path_of(url);
        let (page, query) = path.split_once('?').unwrap_or((path, ""));
        match page {
            "" | "/" | "/index.html" => Ok(self.enter_home()),
            "/cart.html" => Ok(self.enter_cart()),
            "/prod.html" => {
                let id = query
                    .strip_prefix("idp_=")
                    .and_then(|id| id.parse().ok())
                    .ok_or_else(|| ProbeError::Navigation {
                        url: url.to_string(),
                        message: "missing product id".to_string(),
                    })?;
                self.enter_product(id)
            }
            _ => Err(ProbeError::Navigation {
                url: url.to_string(),
                message: "404 Not Found".to_string(),
            }),
        }
    }

    fn reload(&mut self) -> ProbeResult<Vec<MockReaction<Self>>> {
        match self.view {
            View::Home { .. } => Ok(self.enter_home()),
            View::Cart { .. } => Ok(self.enter_cart()),
            View::Product(id) => self.enter_product(id),
        }
    }
}

/// Opens a fresh [`DemoStore`] session per scenario
#[derive(Debug, Clone)]
pub struct DemoStoreFactory {
    config: SuiteConfig,
    faults: StoreFaults,
}

impl DemoStoreFactory {
    /// A factory for stores matching `config`
    #[must_use]
    pub fn new(config: SuiteConfig) -> Self {
        Self {
            config,
            faults: StoreFaults::none(),
        }
    }

    /// Inject faults into every store
    #[must_use]
    pub const fn with_faults(mut self, faults: StoreFaults) -> Self {
        self.faults = faults;
        self
    }
}

#[async_trait]
impl SessionFactory for DemoStoreFactory {
    async fn open(&self) -> ProbeResult<Box<dyn UiSession>> {
        let store = DemoStore::from_config(&self.config).with_faults(self.faults);
        Ok(Box::new(store.into_session()))
    }

    fn describe(&self) -> String {
        "in-memory demo store".to_string()
    }
}

//! Scenarios: named end-to-end checks run against one fresh session each.

mod cart;
mod login;

use crate::data::TestData;
use crate::pages::PageContext;
use crate::result::{ProbeError, ProbeResult};
use futures::future::BoxFuture;
use std::fmt::Debug;

/// Scenario body
pub type ScenarioFn = for<'c, 'a> fn(&'c ScenarioContext<'a>) -> BoxFuture<'c, ProbeResult<()>>;

/// What a scenario body gets: the pages of its session and the test data
#[derive(Debug, Clone, Copy)]
pub struct ScenarioContext<'a> {
    pages: PageContext<'a>,
    data: &'a TestData,
}

impl<'a> ScenarioContext<'a> {
    /// Create a context
    #[must_use]
    pub fn new(pages: PageContext<'a>, data: &'a TestData) -> Self {
        Self { pages, data }
    }

    /// Page objects for this session
    #[must_use]
    pub const fn pages(&self) -> &PageContext<'a> {
        &self.pages
    }

    /// Accounts and products
    #[must_use]
    pub const fn data(&self) -> &'a TestData {
        self.data
    }

    /// Fail the scenario unless `condition` holds
    pub fn ensure(&self, condition: bool, message: impl Into<String>) -> ProbeResult<()> {
        if condition {
            Ok(())
        } else {
            Err(ProbeError::assertion(message))
        }
    }

    /// Fail the scenario unless `actual == expected`
    pub fn ensure_eq<T: PartialEq + Debug>(&self, actual: T, expected: T, what: &str) -> ProbeResult<()> {
        if actual == expected {
            Ok(())
        } else {
            Err(ProbeError::assertion(format!(
                "{what}: expected {expected:?}, got {actual:?}"
            )))
        }
    }
}

/// A named scenario
#[derive(Clone, Copy)]
pub struct Scenario {
    /// Stable identifier, `group.name`
    pub id: &'static str,
    /// Human-readable title
    pub title: &'static str,
    body: ScenarioFn,
}

impl Scenario {
    /// Create a scenario
    #[must_use]
    pub const fn new(id: &'static str, title: &'static str, body: ScenarioFn) -> Self {
        Self { id, title, body }
    }

    /// Group the scenario belongs to (`cart`, `login`)
    #[must_use]
    pub fn group(&self) -> &'static str {
        self.id.split_once('.').map_or(self.id, |(group, _)| group)
    }

    /// Whether `filter` occurs in the id or the title
    #[must_use]
    pub fn matches(&self, filter: &str) -> bool {
        let filter = filter.to_lowercase();
        self.id.to_lowercase().contains(&filter) || self.title.to_lowercase().contains(&filter)
    }

    /// Open the landing page, then run the body
    pub async fn run(&self, ctx: &ScenarioContext<'_>) -> ProbeResult<()> {
        ctx.pages().base().goto().await?;
        (self.body)(ctx).await
    }
}

impl Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("id", &self.id)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// An ordered set of scenarios
#[derive(Debug, Clone, Default)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalog {
    /// An empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The shopping cart and login suites
    #[must_use]
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for scenario in cart::scenarios().into_iter().chain(login::scenarios()) {
            catalog.push(scenario);
        }
        catalog
    }

    /// Append a scenario
    pub fn push(&mut self, scenario: Scenario) {
        self.scenarios.push(scenario);
    }

    /// All scenarios in order
    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Scenarios matching `filter`, or all of them
    #[must_use]
    pub fn select(&self, filter: Option<&str>) -> Vec<&Scenario> {
        self.scenarios
            .iter()
            .filter(|s| filter.map_or(true, |f| s.matches(f)))
            .collect()
    }

    /// Look up a scenario by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    /// Number of scenarios
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog() {
        let catalog = ScenarioCatalog::standard();
        assert_eq!(catalog.len(), 12);
        let groups: Vec<_> = catalog.scenarios().iter().map(Scenario::group).collect();
        assert_eq!(groups.iter().filter(|g| **g == "cart").count(), 6);
        assert_eq!(groups.iter().filter(|g| **g == "login").count(), 6);
    }

    #[test]
    fn test_ids_are_unique() {
        let catalog = ScenarioCatalog::standard();
        let mut ids: Vec<_> = catalog.scenarios().iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_select_by_substring() {
        let catalog = ScenarioCatalog::standard();
        assert_eq!(catalog.select(Some("login.")).len(), 6);
        assert_eq!(catalog.select(Some("WRONG PASSWORD")).len(), 1);
        assert!(catalog.select(Some("checkout")).is_empty());
        assert_eq!(catalog.select(None).len(), 12);
    }

    #[test]
    fn test_get() {
        let catalog = ScenarioCatalog::standard();
        let scenario = catalog.get("cart.total_price").unwrap();
        assert_eq!(scenario.group(), "cart");
        assert!(catalog.get("cart.nope").is_none());
    }
}

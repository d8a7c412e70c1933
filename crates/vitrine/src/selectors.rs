//! Selector configuration for every page of the store.
//!
//! Defaults target the public demo shop. Each group can be overridden from
//! the suite configuration file, field by field. Selectors are written as
//! single-key maps (`{ css: "#totalp" }`) rather than YAML tags.

use crate::locator::{AriaRole, Selector, SelectorTemplate};
use serde::{Deserialize, Serialize};
use serde_yaml_ng::with::singleton_map_recursive;

/// All selectors used by the page objects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorMap {
    /// Navigation bar and session banner
    #[serde(with = "singleton_map_recursive")]
    pub nav: NavSelectors,
    /// Login modal
    #[serde(with = "singleton_map_recursive")]
    pub login: LoginSelectors,
    /// Home page and catalog
    #[serde(with = "singleton_map_recursive")]
    pub home: HomeSelectors,
    /// Product detail page
    #[serde(with = "singleton_map_recursive")]
    pub product: ProductSelectors,
    /// Cart page
    #[serde(with = "singleton_map_recursive")]
    pub cart: CartSelectors,
}

/// Navigation bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavSelectors {
    /// "Home" link
    pub home: Selector,
    /// "Log in" link
    pub login: Selector,
    /// "Cart" link
    pub cart: Selector,
    /// "Sign up" link
    pub sign_up: Selector,
    /// "Log out" link
    pub logout: Selector,
    /// Banner showing the logged-in user
    pub welcome_user: Selector,
    /// Login modal container
    pub login_modal: Selector,
    /// Sign-up modal container
    pub sign_up_modal: Selector,
}

impl Default for NavSelectors {
    fn default() -> Self {
        Self {
            home: Selector::role(AriaRole::Link, "Home"),
            login: Selector::role(AriaRole::Link, "Log in"),
            cart: Selector::xpath("//a[text()='Cart']"),
            sign_up: Selector::role(AriaRole::Link, "Sign up"),
            logout: Selector::role(AriaRole::Link, "Log out"),
            welcome_user: Selector::css("#nameofuser"),
            login_modal: Selector::css("#logInModal"),
            sign_up_modal: Selector::css("#signInModal"),
        }
    }
}

/// Login modal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginSelectors {
    /// Link that opens the modal
    pub open: Selector,
    /// Username input
    pub username: Selector,
    /// Password input
    pub password: Selector,
    /// Submit button
    pub submit: Selector,
    /// Close button
    pub close: Selector,
}

impl Default for LoginSelectors {
    fn default() -> Self {
        Self {
            open: Selector::css("#login2"),
            username: Selector::css("#loginusername"),
            password: Selector::css("#loginpassword"),
            submit: Selector::css_with_text("#logInModal button", "Log in"),
            close: Selector::css("#logInModal button.btn-secondary"),
        }
    }
}

/// Home page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeSelectors {
    /// Product cards in the catalog grid
    pub product_cards: Selector,
    /// Category link, `{name}` is the category
    pub category: SelectorTemplate,
    /// Product link, `{name}` is the product name
    pub product_link: SelectorTemplate,
    /// Landing carousel
    pub carousel: Selector,
}

impl Default for HomeSelectors {
    fn default() -> Self {
        Self {
            product_cards: Selector::css(".card"),
            category: SelectorTemplate::new(Selector::role(AriaRole::Link, "{name}")),
            product_link: SelectorTemplate::new(Selector::role_exact(AriaRole::Link, "{name}")),
            carousel: Selector::css("#carouselExampleIndicators"),
        }
    }
}

/// Product detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductSelectors {
    /// Product name heading
    pub title: Selector,
    /// Description paragraph
    pub description: Selector,
    /// Price label
    pub price: Selector,
    /// "Add to cart" button
    pub add_to_cart: Selector,
}

impl Default for ProductSelectors {
    fn default() -> Self {
        Self {
            title: Selector::css(".name"),
            description: Selector::css("#more-information p"),
            price: Selector::css(".price-container"),
            add_to_cart: Selector::role(AriaRole::Link, "Add to cart"),
        }
    }
}

/// Cart page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartSelectors {
    /// Item rows
    pub rows: Selector,
    /// Title cell, scoped to a row
    pub row_title: Selector,
    /// Price cell, scoped to a row
    pub row_price: Selector,
    /// Delete link, one per row
    pub delete: Selector,
    /// Total price label
    pub total: Selector,
}

impl Default for CartSelectors {
    fn default() -> Self {
        Self {
            rows: Selector::css(".success"),
            row_title: Selector::css("td:nth-child(2)"),
            row_price: Selector::css("td:nth-child(3)"),
            delete: Selector::role(AriaRole::Link, "Delete"),
            total: Selector::css("#totalp"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let yaml = r##"
cart:
  total: { css: "#cart-total" }
nav:
  cart: { css: "#cartur" }
"##;
        let map: SelectorMap = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(map.cart.total, Selector::css("#cart-total"));
        assert_eq!(map.cart.rows, Selector::css(".success"));
        assert_eq!(map.nav.cart, Selector::css("#cartur"));
        assert_eq!(map.nav.welcome_user, Selector::css("#nameofuser"));
        assert_eq!(map.login, LoginSelectors::default());
    }

    #[test]
    fn test_templates_render_names() {
        let home = HomeSelectors::default();
        assert_eq!(
            home.product_link.render("Apple monitor 24"),
            Selector::role_exact(AriaRole::Link, "Apple monitor 24")
        );
        assert_eq!(
            home.category.render("Laptops"),
            Selector::role(AriaRole::Link, "Laptops")
        );
    }

    #[test]
    fn test_defaults_survive_yaml() {
        let text = serde_yaml_ng::to_string(&SelectorMap::default()).unwrap();
        let back: SelectorMap = serde_yaml_ng::from_str(&text).unwrap();
        assert_eq!(back, SelectorMap::default());
    }
}

//! Test data: accounts and catalog products the scenarios use.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable overriding the valid username
pub const ENV_USERNAME: &str = "DEMOBLAZE_USERNAME";
/// Environment variable overriding the valid password
pub const ENV_PASSWORD: &str = "DEMOBLAZE_PASSWORD";
/// Environment variable overriding the unknown username
pub const ENV_INVALID_USERNAME: &str = "DEMOBLAZE_INVALID_USERNAME";
/// Environment variable overriding the invalid password
pub const ENV_INVALID_PASSWORD: &str = "DEMOBLAZE_INVALID_PASSWORD";

/// Catalog category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Phones
    Phones,
    /// Laptops
    Laptops,
    /// Monitors
    Monitors,
}

impl Category {
    /// All categories in menu order
    pub const ALL: [Self; 3] = [Self::Phones, Self::Laptops, Self::Monitors];

    /// Label shown in the category menu
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Phones => "Phones",
            Self::Laptops => "Laptops",
            Self::Monitors => "Monitors",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Login credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create credentials
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// A product the scenarios browse to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    /// Product name as shown in the catalog
    pub name: String,
    /// Category it is listed under
    pub category: Category,
}

impl ProductRef {
    /// Create a product reference
    #[must_use]
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }
}

/// Products used by the scenarios
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Products {
    /// A phone
    pub phone: ProductRef,
    /// A laptop
    pub laptop: ProductRef,
    /// A monitor
    pub monitor: ProductRef,
}

impl Default for Products {
    fn default() -> Self {
        Self {
            phone: ProductRef::new("Samsung galaxy s6", Category::Phones),
            laptop: ProductRef::new("Sony vaio i5", Category::Laptops),
            monitor: ProductRef::new("Apple monitor 24", Category::Monitors),
        }
    }
}

/// Accounts and products for a suite run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestData {
    /// An account that exists
    pub valid_user: Credentials,
    /// An account that does not exist
    pub invalid_user: Credentials,
    /// Catalog products
    pub products: Products,
}

impl Default for TestData {
    fn default() -> Self {
        Self {
            valid_user: Credentials::new("testuser", "test123"),
            invalid_user: Credentials::new("nonexistentuser", "wrongpassword"),
            products: Products::default(),
        }
    }
}

impl TestData {
    /// Apply credential overrides from the process environment
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply credential overrides from a lookup function.
    ///
    /// Empty values are ignored.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(v) = get(ENV_USERNAME) {
            self.valid_user.username = v;
        }
        if let Some(v) = get(ENV_PASSWORD) {
            self.valid_user.password = v;
        }
        if let Some(v) = get(ENV_INVALID_USERNAME) {
            self.invalid_user.username = v;
        }
        if let Some(v) = get(ENV_INVALID_PASSWORD) {
            self.invalid_user.password = v;
        }
        self
    }
}

/// A throwaway username: `testuser` followed by up to five digits
#[must_use]
pub fn random_username() -> String {
    let n = uuid::Uuid::new_v4().as_u128() % 100_000;
    format!("testuser{n}")
}

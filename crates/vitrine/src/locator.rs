//! Selectors and locators for finding UI elements.
//!
//! A [`Locator`] is a lazy query: a selector, an optional position among its
//! matches, and an optional parent locator it is scoped to. Nothing is
//! resolved until a session operation runs it, so the same locator can be
//! polled repeatedly while the page changes underneath it.
//!
//! Sessions backed by a real page render the locator to JavaScript with
//! [`Locator::to_js`]; the expression evaluates to the array of matching
//! elements.

use serde::{Deserialize, Serialize};
use std::fmt;

/// ARIA roles understood by role selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AriaRole {
    /// Hyperlink
    Link,
    /// Button
    Button,
    /// Text input
    Textbox,
    /// Heading
    Heading,
    /// Table row
    Row,
    /// Table cell
    Cell,
    /// Dialog
    Dialog,
}

impl AriaRole {
    /// Role name as written in markup
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Button => "button",
            Self::Textbox => "textbox",
            Self::Heading => "heading",
            Self::Row => "row",
            Self::Cell => "cell",
            Self::Dialog => "dialog",
        }
    }

    /// CSS matching elements with this role, implicit or explicit
    const fn css(self) -> &'static str {
        match self {
            Self::Link => r#"a[href], [role="link"]"#,
            Self::Button => {
                r#"button, input[type="button"], input[type="submit"], [role="button"]"#
            }
            Self::Textbox => {
                r#"input:not([type]), input[type="text"], input[type="password"], input[type="email"], textarea, [role="textbox"]"#
            }
            Self::Heading => r#"h1, h2, h3, h4, h5, h6, [role="heading"]"#,
            Self::Row => r#"tr, [role="row"]"#,
            Self::Cell => r#"td, [role="cell"]"#,
            Self::Dialog => r#"dialog, [role="dialog"]"#,
        }
    }
}

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector (e.g., "#totalp")
    Css(String),
    /// XPath selector
    #[serde(rename = "xpath")]
    XPath(String),
    /// Leaf elements whose text contains the string
    Text(String),
    /// Test ID selector (data-testid attribute)
    TestId(String),
    /// Elements with an ARIA role and accessible name
    Role {
        /// The role
        role: AriaRole,
        /// Accessible name to match
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Match the name exactly instead of case-insensitive substring
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        exact: bool,
    },
    /// CSS selector filtered by text content
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a role selector matching the name as a substring
    #[must_use]
    pub fn role(role: AriaRole, name: impl Into<String>) -> Self {
        Self::Role {
            role,
            name: Some(name.into()),
            exact: false,
        }
    }

    /// Create a role selector matching the name exactly
    #[must_use]
    pub fn role_exact(role: AriaRole, name: impl Into<String>) -> Self {
        Self::Role {
            role,
            name: Some(name.into()),
            exact: true,
        }
    }

    /// Create a CSS selector filtered by text
    #[must_use]
    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// JavaScript expression yielding the matches below `root`
    fn to_js_matches(&self, root: &str) -> String {
        match self {
            Self::Css(css) => format!("Array.from({root}.querySelectorAll({}))", js_str(css)),
            Self::XPath(expr) => format!(
                "(() => {{ const r = document.evaluate({}, {root}, null, \
                 XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); const out = []; \
                 for (let i = 0; i < r.snapshotLength; i++) out.push(r.snapshotItem(i)); \
                 return out; }})()",
                js_str(expr)
            ),
            Self::Text(text) => format!(
                "Array.from({root}.querySelectorAll('*')).filter(el => el.children.length === 0 \
                 && (el.textContent || '').includes({}))",
                js_str(text)
            ),
            Self::TestId(id) => format!(
                "Array.from({root}.querySelectorAll({}))",
                js_str(&format!("[data-testid=\"{id}\"]"))
            ),
            Self::Role { role, name, exact } => {
                let all = format!(
                    "Array.from({root}.querySelectorAll({}))",
                    js_str(role.css())
                );
                match name {
                    None => all,
                    Some(name) => {
                        let accessible = "(el.getAttribute('aria-label') || el.innerText || el.value || '').trim()";
                        let test = if *exact {
                            format!("{accessible} === {}", js_str(name))
                        } else {
                            format!(
                                "{accessible}.toLowerCase().includes({}.toLowerCase())",
                                js_str(name)
                            )
                        };
                        format!("{all}.filter(el => {test})")
                    }
                }
            }
            Self::CssWithText { css, text } => format!(
                "Array.from({root}.querySelectorAll({})).filter(el => (el.textContent || '').includes({}))",
                js_str(css),
                js_str(text)
            ),
        }
    }

    fn replace(&self, placeholder: &str, value: &str) -> Self {
        let sub = |s: &String| s.replace(placeholder, value);
        match self {
            Self::Css(s) => Self::Css(sub(s)),
            Self::XPath(s) => Self::XPath(sub(s)),
            Self::Text(s) => Self::Text(sub(s)),
            Self::TestId(s) => Self::TestId(sub(s)),
            Self::Role { role, name, exact } => Self::Role {
                role: *role,
                name: name.as_ref().map(sub),
                exact: *exact,
            },
            Self::CssWithText { css, text } => Self::CssWithText {
                css: sub(css),
                text: sub(text),
            },
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::Text(s) => write!(f, "text={s:?}"),
            Self::TestId(s) => write!(f, "test-id={s}"),
            Self::Role { role, name, exact } => {
                write!(f, "role={}", role.as_str())?;
                if let Some(name) = name {
                    let op = if *exact { "=" } else { "~=" };
                    write!(f, "[name{op}{name:?}]")?;
                }
                Ok(())
            }
            Self::CssWithText { css, text } => write!(f, "css={css}[text~={text:?}]"),
        }
    }
}

/// JSON string literals are valid JavaScript string literals
fn js_str(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

/// A selector with a `{name}` placeholder filled in at run time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectorTemplate(Selector);

impl SelectorTemplate {
    /// Placeholder replaced by [`SelectorTemplate::render`]
    pub const PLACEHOLDER: &'static str = "{name}";

    /// Wrap a selector containing the placeholder
    #[must_use]
    pub const fn new(selector: Selector) -> Self {
        Self(selector)
    }

    /// Substitute `name` for the placeholder
    #[must_use]
    pub fn render(&self, name: &str) -> Selector {
        self.0.replace(Self::PLACEHOLDER, name)
    }
}

/// A lazy, chainable element query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    selector: Selector,
    index: Option<usize>,
    parent: Option<Box<Locator>>,
}

impl Locator {
    /// Create a locator from a selector
    #[must_use]
    pub const fn new(selector: Selector) -> Self {
        Self {
            selector,
            index: None,
            parent: None,
        }
    }

    /// Restrict to the `index`-th match (zero-based)
    #[must_use]
    pub fn nth(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Restrict to the first match
    #[must_use]
    pub fn first(self) -> Self {
        self.nth(0)
    }

    /// Scope a child selector to this locator's matches
    #[must_use]
    pub fn locator(&self, selector: Selector) -> Self {
        Self {
            selector,
            index: None,
            parent: Some(Box::new(self.clone())),
        }
    }

    /// The innermost selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Position filter, if any
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.index
    }

    /// Parent scope, if any
    #[must_use]
    pub fn parent(&self) -> Option<&Self> {
        self.parent.as_deref()
    }

    /// Steps from the outermost scope to this locator
    fn chain(&self) -> Vec<&Self> {
        let mut chain = vec![self];
        let mut current = self;
        while let Some(parent) = current.parent.as_deref() {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// JavaScript expression evaluating to the array of matched elements
    #[must_use]
    pub fn to_js(&self) -> String {
        let mut js = String::from("(() => { let scope = [document];");
        for step in self.chain() {
            js.push_str(&format!(
                " scope = scope.flatMap(root => {});",
                step.selector.to_js_matches("root")
            ));
            if let Some(i) = step.index {
                js.push_str(&format!(
                    " scope = scope[{i}] === undefined ? [] : [scope[{i}]];"
                ));
            }
        }
        js.push_str(" return scope; })()");
        js
    }
}

impl From<Selector> for Locator {
    fn from(selector: Selector) -> Self {
        Self::new(selector)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.parent {
            write!(f, "{parent} >> ")?;
        }
        write!(f, "{}", self.selector)?;
        if let Some(i) = self.index {
            write!(f, " >> nth={i}")?;
        }
        Ok(())
    }
}

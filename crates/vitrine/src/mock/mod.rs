//! Scripted in-memory sessions.
//!
//! A [`MockApp`] is a synchronous model of a web application: it answers
//! selector queries with [`MockElement`]s and reacts to clicks, input and
//! navigation. [`MockSession`] adapts any such model to [`UiSession`],
//! applying delayed reactions on tokio timers and raising dialogs through a
//! [`SignalHub`], so the waiting primitives see the same eventual
//! consistency they would see in a real browser.
//!
//! [`DemoStore`] models the demo shop the standard scenarios run against.

mod store;

pub use store::{DemoStore, DemoStoreFactory, StoreFaults};

use crate::dialog::{AutoDialogBehavior, Dialog, DialogLog};
use crate::locator::{Locator, Selector};
use crate::result::{ProbeError, ProbeResult};
use crate::session::UiSession;
use crate::signal::{ArmedSignal, SignalHub, SignalKind};
use crate::wait::WaitOptions;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::trace;

/// An element as a mock application renders it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Identity used to route clicks and input back to the app
    pub key: String,
    /// Text content
    pub text: String,
    /// Whether the element is displayed
    pub visible: bool,
}

impl MockElement {
    /// A visible element
    #[must_use]
    pub fn shown(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
            visible: true,
        }
    }

    /// An element with explicit visibility
    #[must_use]
    pub fn with_visibility(key: impl Into<String>, text: impl Into<String>, visible: bool) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
            visible,
        }
    }
}

/// Deferred state change applied to the app
pub type Deferred<A> = Box<dyn FnOnce(&mut A) -> Vec<MockReaction<A>> + Send>;

/// What an app does in response to an input
pub enum MockReaction<A> {
    /// Raise a dialog now
    Dialog(Dialog),
    /// Change state after a delay, possibly reacting further
    After {
        /// Delay before applying
        delay: Duration,
        /// The change
        apply: Deferred<A>,
    },
}

impl<A> MockReaction<A> {
    /// Schedule a state change
    pub fn after(delay: Duration, apply: impl FnOnce(&mut A) -> Vec<Self> + Send + 'static) -> Self {
        Self::After {
            delay,
            apply: Box::new(apply),
        }
    }

    /// Raise an alert
    pub fn alert(message: impl Into<String>) -> Self {
        Self::Dialog(Dialog::alert(message))
    }
}

impl<A> std::fmt::Debug for MockReaction<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dialog(dialog) => f.debug_tuple("Dialog").field(dialog).finish(),
            Self::After { delay, .. } => f.debug_struct("After").field("delay", delay).finish_non_exhaustive(),
        }
    }
}

/// A synchronous application model driven by [`MockSession`]
pub trait MockApp: Sized + Send + 'static {
    /// Elements matching `selector`, inside the element `scope` if given
    fn query(&self, scope: Option<&str>, selector: &Selector) -> ProbeResult<Vec<MockElement>>;

    /// React to a click on the element `key`
    fn click(&mut self, key: &str) -> ProbeResult<Vec<MockReaction<Self>>>;

    /// Set the value of the input `key`
    fn fill(&mut self, key: &str, value: &str) -> ProbeResult<()>;

    /// Load `url`
    fn navigate(&mut self, url: &str) -> ProbeResult<Vec<MockReaction<Self>>>;

    /// Reload the current page
    fn reload(&mut self) -> ProbeResult<Vec<MockReaction<Self>>>;
}

/// Resolve a locator chain against an app, outermost scope first
fn resolve<A: MockApp>(app: &A, locator: &Locator) -> ProbeResult<Vec<MockElement>> {
    let scopes = match locator.parent() {
        None => vec![None],
        Some(parent) => resolve(app, parent)?.into_iter().map(Some).collect(),
    };

    let mut found = Vec::new();
    for scope in &scopes {
        let key = scope.as_ref().map(|e| e.key.as_str());
        found.extend(app.query(key, locator.selector())?);
    }
    if let Some(index) = locator.index() {
        found = found.into_iter().nth(index).into_iter().collect();
    }
    Ok(found)
}

/// A [`UiSession`] over a [`MockApp`]
pub struct MockSession<A: MockApp> {
    app: Arc<Mutex<A>>,
    hub: Arc<SignalHub>,
}

impl<A: MockApp> MockSession<A> {
    /// Wrap an app; unobserved dialogs are dismissed
    #[must_use]
    pub fn new(app: A) -> Self {
        Self::with_dialog_behavior(app, AutoDialogBehavior::default())
    }

    /// Wrap an app with a fallback for unobserved dialogs
    #[must_use]
    pub fn with_dialog_behavior(app: A, behavior: AutoDialogBehavior) -> Self {
        Self {
            app: Arc::new(Mutex::new(app)),
            hub: Arc::new(SignalHub::new(behavior)),
        }
    }

    /// Dialogs raised so far
    #[must_use]
    pub fn dialogs(&self) -> &DialogLog {
        self.hub.log()
    }

    /// Inspect the app state
    pub fn with_app<R>(&self, inspect: impl FnOnce(&A) -> R) -> ProbeResult<R> {
        Ok(inspect(&*lock(&self.app)?))
    }

    fn apply(&self, reactions: Vec<MockReaction<A>>) {
        dispatch(&self.app, &self.hub, reactions);
    }
}

impl<A: MockApp> std::fmt::Debug for MockSession<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSession")
            .field("dialogs", self.hub.log())
            .finish_non_exhaustive()
    }
}

fn lock<A>(app: &Mutex<A>) -> ProbeResult<MutexGuard<'_, A>> {
    app.lock()
        .map_err(|_| ProbeError::session("mock application state poisoned"))
}

fn dispatch<A: MockApp>(app: &Arc<Mutex<A>>, hub: &Arc<SignalHub>, reactions: Vec<MockReaction<A>>) {
    for reaction in reactions {
        match reaction {
            MockReaction::Dialog(dialog) => {
                hub.deliver(dialog);
            }
            MockReaction::After { delay, apply } => {
                let app = Arc::clone(app);
                let hub = Arc::clone(hub);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let next = match app.lock() {
                        Ok(mut state) => apply(&mut *state),
                        Err(_) => return,
                    };
                    trace!(?delay, "deferred mock reaction applied");
                    dispatch(&app, &hub, next);
                });
            }
        }
    }
}

#[async_trait]
impl<A: MockApp> UiSession for MockSession<A> {
    async fn navigate(&self, url: &str) -> ProbeResult<()> {
        let reactions = lock(&self.app)?.navigate(url)?;
        self.apply(reactions);
        Ok(())
    }

    async fn reload(&self) -> ProbeResult<()> {
        let reactions = lock(&self.app)?.reload()?;
        self.apply(reactions);
        Ok(())
    }

    async fn wait_for_load(&self, _options: &WaitOptions) -> ProbeResult<()> {
        Ok(())
    }

    async fn count(&self, locator: &Locator) -> ProbeResult<usize> {
        Ok(resolve(&*lock(&self.app)?, locator)?.len())
    }

    async fn is_visible_now(&self, locator: &Locator) -> ProbeResult<bool> {
        let found = resolve(&*lock(&self.app)?, locator)?;
        Ok(found.first().is_some_and(|e| e.visible))
    }

    async fn read_text(&self, locator: &Locator) -> ProbeResult<String> {
        let found = resolve(&*lock(&self.app)?, locator)?;
        found
            .into_iter()
            .next()
            .map(|e| e.text)
            .ok_or_else(|| ProbeError::ElementNotFound {
                locator: locator.to_string(),
            })
    }

    async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        let reactions = {
            let mut app = lock(&self.app)?;
            let target = resolve(&*app, locator)?
                .into_iter()
                .next()
                .ok_or_else(|| ProbeError::ElementNotFound {
                    locator: locator.to_string(),
                })?;
            app.click(&target.key)?
        };
        self.apply(reactions);
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
        let mut app = lock(&self.app)?;
        let target = resolve(&*app, locator)?
            .into_iter()
            .next()
            .ok_or_else(|| ProbeError::ElementNotFound {
                locator: locator.to_string(),
            })?;
        app.fill(&target.key, value)
    }

    async fn on_next_signal(&self, kind: SignalKind) -> ProbeResult<ArmedSignal> {
        match kind {
            SignalKind::Dialog => Ok(self.hub.arm()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::signal::capture_event;
    use tokio::time::Instant;

    /// A counter page: one button, one label, one list of items
    #[derive(Default)]
    struct Counter {
        value: usize,
        items: Vec<String>,
    }

    impl MockApp for Counter {
        fn query(&self, scope: Option<&str>, selector: &Selector) -> ProbeResult<Vec<MockElement>> {
            let Selector::Css(css) = selector else {
                return Ok(Vec::new());
            };
            Ok(match (scope, css.as_str()) {
                (None, "#inc") => vec![MockElement::shown("inc", "+1")],
                (None, "#value") => vec![MockElement::shown("value", self.value.to_string())],
                (None, "li") => self
                    .items
                    .iter()
                    .enumerate()
                    .map(|(i, t)| MockElement::shown(format!("li{i}"), t.clone()))
                    .collect(),
                (Some(parent), "span") => vec![MockElement::with_visibility(
                    format!("{parent}-span"),
                    format!("inside {parent}"),
                    false,
                )],
                _ => Vec::new(),
            })
        }

        fn click(&mut self, key: &str) -> ProbeResult<Vec<MockReaction<Self>>> {
            if key != "inc" {
                return Ok(Vec::new());
            }
            Ok(vec![MockReaction::after(Duration::from_millis(200), |app: &mut Self| {
                app.value += 1;
                app.items.push(format!("item {}", app.value));
                vec![MockReaction::alert(format!("now {}", app.value))]
            })])
        }

        fn fill(&mut self, _key: &str, _value: &str) -> ProbeResult<()> {
            Ok(())
        }

        fn navigate(&mut self, _url: &str) -> ProbeResult<Vec<MockReaction<Self>>> {
            Ok(Vec::new())
        }

        fn reload(&mut self) -> ProbeResult<Vec<MockReaction<Self>>> {
            self.value = 0;
            Ok(Vec::new())
        }
    }

    fn css(s: &str) -> Locator {
        Locator::new(Selector::css(s))
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_reaction_and_dialog() {
        let session = MockSession::new(Counter::default());
        let armed = session.on_next_signal(SignalKind::Dialog).await.unwrap();
        let start = Instant::now();

        session.click(&css("#inc")).await.unwrap();
        assert_eq!(session.read_text(&css("#value")).await.unwrap(), "0");

        let event = capture_event(armed, Duration::from_secs(1)).await;
        assert_eq!(event.message(), "now 1");
        assert_eq!(start.elapsed(), Duration::from_millis(200));
        assert_eq!(session.read_text(&css("#value")).await.unwrap(), "1");
        assert_eq!(session.dialogs().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chained_and_indexed_resolution() {
        let session = MockSession::new(Counter {
            value: 2,
            items: vec!["a".into(), "b".into()],
        });

        assert_eq!(session.count(&css("li")).await.unwrap(), 2);
        assert_eq!(session.read_text(&css("li").nth(1)).await.unwrap(), "b");
        assert_eq!(session.count(&css("li").nth(5)).await.unwrap(), 0);

        let spans = css("li").locator(Selector::css("span"));
        assert_eq!(session.count(&spans).await.unwrap(), 2);
        assert_eq!(
            session.read_text(&css("li").nth(1).locator(Selector::css("span"))).await.unwrap(),
            "inside li1"
        );
        assert!(!session.is_visible_now(&spans).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_element_errors() {
        let session = MockSession::new(Counter::default());
        let err = session.click(&css("#nope")).await.unwrap_err();
        assert!(matches!(err, ProbeError::ElementNotFound { .. }));
        assert!(session.read_text(&css("#nope")).await.is_err());
        assert!(!session.is_visible_now(&css("#nope")).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unobserved_dialog_is_dismissed() {
        let session = MockSession::new(Counter::default());
        session.click(&css("#inc")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(session.dialogs().missed().len(), 1);
        assert_eq!(session.with_app(|app| app.value).unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_routes_to_app() {
        let session = MockSession::new(Counter {
            value: 7,
            items: Vec::new(),
        });
        session.reload().await.unwrap();
        assert_eq!(session.read_text(&css("#value")).await.unwrap(), "0");
    }
}

//! The UI-session boundary.
//!
//! [`UiSession`] is the narrow, asynchronous surface the page objects drive:
//! navigation, element queries by [`Locator`], input, and one-shot signal
//! arming. Implementations exist for a live browser over CDP (feature
//! `browser`) and for the scripted in-memory store in [`crate::mock`].
//!
//! Session queries never wait. Waiting is layered on top through
//! [`ElementRef`], which turns a locator into an auto-waiting handle.

use crate::locator::{Locator, Selector};
use crate::result::{ProbeError, ProbeResult};
use crate::signal::{ArmedSignal, SignalKind};
use crate::wait::{await_condition, await_value, WaitOptions};
use async_trait::async_trait;
use tracing::debug;

/// An interactive UI session (one browser page or one simulated page)
#[async_trait]
pub trait UiSession: Send + Sync {
    /// Navigate to an absolute URL
    async fn navigate(&self, url: &str) -> ProbeResult<()>;

    /// Reload the current page
    async fn reload(&self) -> ProbeResult<()>;

    /// Wait until the current document has finished loading
    async fn wait_for_load(&self, options: &WaitOptions) -> ProbeResult<()>;

    /// Number of elements currently matching the locator
    async fn count(&self, locator: &Locator) -> ProbeResult<usize>;

    /// Whether the first match exists and is visible right now
    async fn is_visible_now(&self, locator: &Locator) -> ProbeResult<bool>;

    /// Text content of the first match
    async fn read_text(&self, locator: &Locator) -> ProbeResult<String>;

    /// Click the first match
    async fn click(&self, locator: &Locator) -> ProbeResult<()>;

    /// Replace the value of the first match
    async fn fill(&self, locator: &Locator, value: &str) -> ProbeResult<()>;

    /// Arm a listener for the next signal of `kind`.
    ///
    /// Must be called before the action that may trigger the signal.
    async fn on_next_signal(&self, kind: SignalKind) -> ProbeResult<ArmedSignal>;

    /// Release the session. Sessions with nothing to release keep the default.
    async fn close(&self) -> ProbeResult<()> {
        Ok(())
    }
}

impl dyn UiSession + '_ {
    /// Create an auto-waiting handle for elements matching `locator`
    pub fn find(&self, locator: impl Into<Locator>) -> ElementRef<'_> {
        ElementRef::new(self, locator.into())
    }
}

/// A lazy element handle bound to a session.
///
/// Actions wait for the locator to resolve to exactly one visible element
/// within the action budget. Queries read the current state without waiting.
#[derive(Clone)]
pub struct ElementRef<'s> {
    session: &'s dyn UiSession,
    locator: Locator,
    action: WaitOptions,
}

impl<'s> ElementRef<'s> {
    /// Bind a locator to a session with the default action budget
    #[must_use]
    pub fn new(session: &'s dyn UiSession, locator: Locator) -> Self {
        Self {
            session,
            locator,
            action: WaitOptions::default(),
        }
    }

    /// Use a different budget for actionability waits
    #[must_use]
    pub const fn with_action_timeout(mut self, options: WaitOptions) -> Self {
        self.action = options;
        self
    }

    /// The underlying locator
    #[must_use]
    pub const fn as_locator(&self) -> &Locator {
        &self.locator
    }

    /// Handle for the `index`-th match
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        Self {
            session: self.session,
            locator: self.locator.clone().nth(index),
            action: self.action,
        }
    }

    /// Handle for `selector` scoped to this element's matches
    #[must_use]
    pub fn locator(&self, selector: Selector) -> Self {
        Self {
            session: self.session,
            locator: self.locator.locator(selector),
            action: self.action,
        }
    }

    /// Whether anything matches right now
    pub async fn exists(&self) -> ProbeResult<bool> {
        Ok(self.session.count(&self.locator).await? > 0)
    }

    /// Number of matches right now
    pub async fn count(&self) -> ProbeResult<usize> {
        self.session.count(&self.locator).await
    }

    /// Whether the element becomes visible within the budget.
    ///
    /// Query failures count as "not visible yet"; a zero timeout is a single
    /// check.
    pub async fn is_visible(&self, options: &WaitOptions) -> bool {
        let session = self.session;
        let locator = &self.locator;
        await_condition(|| session.is_visible_now(locator), options)
            .await
            .succeeded
    }

    /// Text content of the first match, without waiting
    pub async fn read_text(&self) -> ProbeResult<String> {
        self.session.read_text(&self.locator).await
    }

    /// Wait until actionable, then click
    pub async fn click(&self) -> ProbeResult<()> {
        self.wait_actionable("click").await?;
        self.session.click(&self.locator).await
    }

    /// Wait until actionable, then fill
    pub async fn fill(&self, value: &str) -> ProbeResult<()> {
        self.wait_actionable("fill").await?;
        self.session.fill(&self.locator, value).await
    }

    /// Wait for exactly one visible match.
    ///
    /// More than one match is a strict-mode violation and fails at once.
    async fn wait_actionable(&self, action: &str) -> ProbeResult<()> {
        let session = self.session;
        let locator = &self.locator;
        let (poll, found) = await_value(
            || async move {
                let count = session.count(locator).await?;
                if count > 1 {
                    return Ok(Some(Err(count)));
                }
                if count == 1 && session.is_visible_now(locator).await? {
                    return Ok(Some(Ok(())));
                }
                Ok::<_, ProbeError>(None)
            },
            &self.action,
        )
        .await;

        match found {
            Some(Ok(())) => {
                debug!(%locator, action, attempts = poll.attempts, "element actionable");
                Ok(())
            }
            Some(Err(count)) => Err(ProbeError::StrictModeViolation {
                locator: locator.to_string(),
                count,
            }),
            None => Err(ProbeError::Timeout {
                ms: self.action.timeout_ms,
                waited_for: format!("{locator} to be visible for {action}"),
            }),
        }
    }
}

impl std::fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementRef")
            .field("locator", &self.locator.to_string())
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::signal::SignalHub;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;

    /// One selector whose match count and visibility the test controls
    #[derive(Default)]
    struct Stub {
        matches: Arc<AtomicUsize>,
        visible: Arc<AtomicBool>,
        clicks: AtomicUsize,
        hub: SignalHub,
    }

    #[async_trait]
    impl UiSession for Stub {
        async fn navigate(&self, _url: &str) -> ProbeResult<()> {
            Ok(())
        }

        async fn reload(&self) -> ProbeResult<()> {
            Ok(())
        }

        async fn wait_for_load(&self, _options: &WaitOptions) -> ProbeResult<()> {
            Ok(())
        }

        async fn count(&self, locator: &Locator) -> ProbeResult<usize> {
            let all = self.matches.load(Ordering::SeqCst);
            Ok(match locator.index() {
                Some(i) => usize::from(i < all),
                None => all,
            })
        }

        async fn is_visible_now(&self, locator: &Locator) -> ProbeResult<bool> {
            Ok(self.count(locator).await? > 0 && self.visible.load(Ordering::SeqCst))
        }

        async fn read_text(&self, locator: &Locator) -> ProbeResult<String> {
            if self.count(locator).await? == 0 {
                return Err(ProbeError::ElementNotFound {
                    locator: locator.to_string(),
                });
            }
            Ok("Welcome alice".into())
        }

        async fn click(&self, _locator: &Locator) -> ProbeResult<()> {
            self.clicks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn fill(&self, _locator: &Locator, _value: &str) -> ProbeResult<()> {
            Ok(())
        }

        async fn on_next_signal(&self, _kind: SignalKind) -> ProbeResult<ArmedSignal> {
            Ok(self.hub.arm())
        }
    }

    fn stub(matches: usize, visible: bool) -> Stub {
        let stub = Stub::default();
        stub.matches.store(matches, Ordering::SeqCst);
        stub.visible.store(visible, Ordering::SeqCst);
        stub
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_waits_for_visibility() {
        let session = stub(1, false);
        let visible = Arc::clone(&session.visible);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(600)).await;
            visible.store(true, Ordering::SeqCst);
        });

        let dyn_session: &dyn UiSession = &session;
        dyn_session.find(Selector::css("#login2")).click().await.unwrap();
        assert_eq!(session.clicks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_times_out_on_hidden_element() {
        let session = stub(1, false);
        let dyn_session: &dyn UiSession = &session;
        let start = Instant::now();

        let err = dyn_session
            .find(Selector::css("#logout2"))
            .with_action_timeout(WaitOptions::new().with_timeout(1000))
            .click()
            .await
            .unwrap_err();

        assert!(matches!(err, ProbeError::Timeout { ms: 1000, .. }));
        assert_eq!(start.elapsed(), Duration::from_secs(1));
        assert_eq!(session.clicks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_is_strict() {
        let session = stub(3, true);
        let dyn_session: &dyn UiSession = &session;
        let links = dyn_session.find(Selector::css(".hrefch"));

        let err = links.click().await.unwrap_err();
        assert!(matches!(
            err,
            ProbeError::StrictModeViolation { count: 3, .. }
        ));

        links.nth(2).click().await.unwrap();
        assert_eq!(session.clicks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_is_visible_respects_budget() {
        let session = stub(0, true);
        let dyn_session: &dyn UiSession = &session;
        let banner = dyn_session.find(Selector::css("#nameofuser"));
        let start = Instant::now();

        assert!(!banner.is_visible(&WaitOptions::new().with_timeout(3000)).await);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
        assert!(!banner.exists().await.unwrap());
        assert!(banner.read_text().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_is_single_check() {
        let session = stub(1, true);
        let dyn_session: &dyn UiSession = &session;
        let banner = dyn_session.find(Selector::css("#nameofuser"));

        assert!(banner.is_visible(&WaitOptions::new().with_timeout(0)).await);
        assert_eq!(banner.read_text().await.unwrap(), "Welcome alice");
        assert_eq!(banner.count().await.unwrap(), 1);
    }

    #[test]
    fn test_scoped_handles_build_chained_locators() {
        let session = stub(0, false);
        let dyn_session: &dyn UiSession = &session;
        let cell = dyn_session
            .find(Selector::css(".success"))
            .nth(1)
            .locator(Selector::css("td:nth-child(2)"));
        assert_eq!(
            cell.as_locator().to_string(),
            "css=.success >> nth=1 >> css=td:nth-child(2)"
        );
        assert!(format!("{cell:?}").contains("ElementRef"));
    }
}

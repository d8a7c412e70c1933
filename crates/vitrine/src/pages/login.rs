use super::PageContext;
use crate::data::Credentials;
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use crate::signal::SignalKind;
use crate::wait::{await_value, wait_until, WaitOptions};
use serde::Serialize;
use tracing::{debug, info};

/// Fallback message when the banner is missing but the login link is gone
pub const LOGGED_IN_WITHOUT_BANNER: &str =
    "User appears to be logged in, but welcome message not found";

/// Message when neither an alert nor a logged-in state was observed
pub const LOGIN_UNCONFIRMED: &str = "Login failed - could not confirm successful login";

/// Result of a login attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
    /// The user ended up logged in
    pub success: bool,
    /// Welcome text on success, alert text or diagnostic on failure
    pub message: String,
}

impl LoginOutcome {
    fn new(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: message.into(),
        }
    }
}

/// Whichever answer the page gives first
enum LoginSignal {
    Alert(String),
    Welcome,
}

/// Login modal
#[derive(Debug, Clone, Copy)]
pub struct LoginPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> LoginPage<'a> {
    /// Wrap a context
    #[must_use]
    pub fn new(ctx: PageContext<'a>) -> Self {
        Self { ctx }
    }

    /// Load the landing page and open the login modal
    pub async fn open(&self) -> ProbeResult<()> {
        self.ctx.base().goto().await?;
        let login = &self.ctx.selectors.login;
        self.ctx.element(&login.open).click().await?;

        let session = self.ctx.session;
        let username = Locator::from(login.username.clone());
        wait_until(
            "login form",
            || session.is_visible_now(&username),
            &self.ctx.waits.navigation(),
        )
        .await?;
        Ok(())
    }

    /// Submit credentials and report what the page said.
    ///
    /// The dialog listener is armed before the submit click. After the click
    /// the page is polled for either an alert or the welcome banner, so a
    /// successful login returns as soon as the banner appears.
    pub async fn login(&self, credentials: &Credentials) -> ProbeResult<LoginOutcome> {
        self.open().await?;
        let login = &self.ctx.selectors.login;
        self.ctx.element(&login.username).fill(&credentials.username).await?;
        self.ctx.element(&login.password).fill(&credentials.password).await?;

        let session = self.ctx.session;
        let mut armed = session.on_next_signal(SignalKind::Dialog).await?;
        self.ctx.element(&login.submit).click().await?;

        let banner = Locator::from(self.ctx.selectors.nav.welcome_user.clone());
        let (poll, signal) = await_value(
            || {
                let alert = armed.try_take();
                let banner = &banner;
                async move {
                    if let Some(message) = alert {
                        return Ok(Some(LoginSignal::Alert(message)));
                    }
                    let visible = session.is_visible_now(banner).await?;
                    Ok::<_, ProbeError>(visible.then_some(LoginSignal::Welcome))
                }
            },
            &self.ctx.waits.login(),
        )
        .await;
        // an alert may land between the last poll and the deadline
        let signal = signal.or_else(|| armed.try_take().map(LoginSignal::Alert));
        debug!(attempts = poll.attempts, "login answer polled");

        let outcome = match signal {
            Some(LoginSignal::Alert(message)) => LoginOutcome::new(false, message),
            Some(LoginSignal::Welcome) => {
                let text = self.ctx.base().user_welcome_message().await?;
                LoginOutcome::new(true, text)
            }
            None => {
                let still_offered = session
                    .is_visible_now(&Locator::from(login.open.clone()))
                    .await
                    .unwrap_or(true);
                if still_offered {
                    LoginOutcome::new(false, LOGIN_UNCONFIRMED)
                } else {
                    LoginOutcome::new(true, LOGGED_IN_WITHOUT_BANNER)
                }
            }
        };
        info!(user = %credentials.username, success = outcome.success, "login attempted");
        Ok(outcome)
    }

    /// Close the modal and confirm the form is hidden
    pub async fn close_login_modal(&self) -> ProbeResult<()> {
        let login = &self.ctx.selectors.login;
        self.ctx.element(&login.close).click().await?;

        let session = self.ctx.session;
        let username = Locator::from(login.username.clone());
        wait_until(
            "login form to close",
            || {
                let query = session.is_visible_now(&username);
                async move { query.await.map(|visible| !visible) }
            },
            &self.ctx.waits.action(),
        )
        .await?;
        Ok(())
    }

    /// Whether the login form is showing right now
    pub async fn is_form_visible(&self) -> bool {
        self.ctx
            .element(&self.ctx.selectors.login.username)
            .is_visible(&WaitOptions::new().with_timeout(0))
            .await
    }
}

use super::PageContext;
use crate::locator::{Locator, Selector};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::wait_until;
use tracing::debug;

/// Navigation bar and session banner, shared by every page
#[derive(Debug, Clone, Copy)]
pub struct BasePage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> BasePage<'a> {
    /// Wrap a context
    #[must_use]
    pub fn new(ctx: PageContext<'a>) -> Self {
        Self { ctx }
    }

    /// Open the store's landing page
    pub async fn goto(&self) -> ProbeResult<()> {
        self.ctx.session.navigate(&self.ctx.url("/")).await?;
        self.wait_for_page_load().await
    }

    /// Wait for the document to finish loading
    pub async fn wait_for_page_load(&self) -> ProbeResult<()> {
        self.ctx
            .session
            .wait_for_load(&self.ctx.waits.navigation())
            .await
    }

    /// Follow the "Home" link
    pub async fn navigate_to_home(&self) -> ProbeResult<()> {
        self.ctx.element(&self.ctx.selectors.nav.home).click().await?;
        self.wait_for_page_load().await
    }

    /// Open the login modal from the navigation bar
    pub async fn navigate_to_login(&self) -> ProbeResult<()> {
        let nav = &self.ctx.selectors.nav;
        self.ctx.element(&nav.login).click().await?;
        self.wait_visible(&nav.login_modal, "login modal").await
    }

    /// Follow the "Cart" link
    pub async fn navigate_to_cart(&self) -> ProbeResult<()> {
        self.ctx.element(&self.ctx.selectors.nav.cart).click().await?;
        self.wait_for_page_load().await
    }

    /// Open the sign-up modal
    pub async fn navigate_to_sign_up(&self) -> ProbeResult<()> {
        let nav = &self.ctx.selectors.nav;
        self.ctx.element(&nav.sign_up).click().await?;
        self.wait_visible(&nav.sign_up_modal, "sign-up modal").await
    }

    /// Log out and confirm the "Log in" link is back
    pub async fn logout(&self) -> ProbeResult<()> {
        let nav = &self.ctx.selectors.nav;
        self.wait_visible(&nav.logout, "logout link").await?;
        self.ctx.element(&nav.logout).click().await?;
        self.wait_for_page_load().await?;

        let login_link = self.ctx.element(&nav.login);
        if login_link.is_visible(&self.ctx.waits.action()).await {
            debug!("logged out");
            Ok(())
        } else {
            Err(ProbeError::assertion(
                "login link should be visible after logout",
            ))
        }
    }

    /// Whether the welcome banner shows within the visibility budget
    pub async fn is_user_logged_in(&self) -> bool {
        self.ctx
            .element(&self.ctx.selectors.nav.welcome_user)
            .is_visible(&self.ctx.waits.visibility())
            .await
    }

    /// Text of the welcome banner, once visible
    pub async fn user_welcome_message(&self) -> ProbeResult<String> {
        let banner = &self.ctx.selectors.nav.welcome_user;
        self.wait_visible(banner, "welcome banner").await?;
        Ok(self.ctx.element(banner).read_text().await?.trim().to_string())
    }

    async fn wait_visible(&self, selector: &Selector, what: &str) -> ProbeResult<()> {
        let session = self.ctx.session;
        let locator = Locator::from(selector.clone());
        wait_until(
            what,
            || session.is_visible_now(&locator),
            &self.ctx.waits.navigation(),
        )
        .await
        .map(|_| ())
    }
}

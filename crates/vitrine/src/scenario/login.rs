use super::{Scenario, ScenarioContext};
use crate::data::{Category, Credentials};
use crate::result::ProbeResult;
use futures::future::BoxFuture;

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "login.valid_credentials",
            "should login successfully with valid credentials",
            valid_credentials,
        ),
        Scenario::new(
            "login.unknown_user",
            "should display error message with invalid credentials",
            unknown_user,
        ),
        Scenario::new(
            "login.wrong_password",
            "should display error message with valid username but wrong password",
            wrong_password,
        ),
        Scenario::new(
            "login.session_persists",
            "should maintain login state across page navigation",
            session_persists,
        ),
        Scenario::new(
            "login.logout",
            "should logout successfully",
            logout,
        ),
        Scenario::new(
            "login.close_modal",
            "should close login modal when clicking close button",
            close_modal,
        ),
    ]
}

/// Log in as the valid user and require success
async fn log_in(ctx: &ScenarioContext<'_>) -> ProbeResult<()> {
    let outcome = ctx.pages().login().login(&ctx.data().valid_user).await?;
    ctx.ensure(
        outcome.success,
        format!("login should succeed, got {:?}", outcome.message),
    )
}

/// Attempt a login and require the given alert
async fn expect_rejection(ctx: &ScenarioContext<'_>, credentials: &Credentials, alert: &str) -> ProbeResult<()> {
    let outcome = ctx.pages().login().login(credentials).await?;
    ctx.ensure(!outcome.success, "login should be rejected")?;
    ctx.ensure(
        outcome.message.contains(alert),
        format!("expected alert {alert:?}, got {:?}", outcome.message),
    )
}

fn valid_credentials<'c>(ctx: &'c ScenarioContext<'_>) -> BoxFuture<'c, ProbeResult<()>> {
    Box::pin(async move {
        let user = &ctx.data().valid_user;
        let outcome = ctx.pages().login().login(user).await?;
        ctx.ensure(outcome.success, format!("login failed: {}", outcome.message))?;
        ctx.ensure(
            outcome.message.contains(&format!("Welcome {}", user.username)),
            format!("unexpected banner {:?}", outcome.message),
        )
    })
}

fn unknown_user<'c>(ctx: &'c ScenarioContext<'_>) -> BoxFuture<'c, ProbeResult<()>> {
    Box::pin(async move { expect_rejection(ctx, &ctx.data().invalid_user, "User does not exist").await })
}

fn wrong_password<'c>(ctx: &'c ScenarioContext<'_>) -> BoxFuture<'c, ProbeResult<()>> {
    Box::pin(async move {
        let data = ctx.data();
        let credentials = Credentials::new(&data.valid_user.username, &data.invalid_user.password);
        expect_rejection(ctx, &credentials, "Wrong password").await
    })
}

fn session_persists<'c>(ctx: &'c ScenarioContext<'_>) -> BoxFuture<'c, ProbeResult<()>> {
    Box::pin(async move {
        log_in(ctx).await?;
        let pages = ctx.pages();

        for category in [Category::Phones, Category::Laptops] {
            pages.home().select_category(category).await?;
            ctx.ensure(
                pages.base().is_user_logged_in().await,
                format!("logged out after browsing {category}"),
            )?;
        }

        pages.base().navigate_to_cart().await?;
        ctx.ensure(pages.base().is_user_logged_in().await, "logged out on the cart page")?;

        pages.base().navigate_to_home().await?;
        ctx.ensure(pages.base().is_user_logged_in().await, "logged out back on home")
    })
}

fn logout<'c>(ctx: &'c ScenarioContext<'_>) -> BoxFuture<'c, ProbeResult<()>> {
    Box::pin(async move {
        log_in(ctx).await?;
        let base = ctx.pages().base();
        ctx.ensure(base.is_user_logged_in().await, "banner should show after login")?;
        base.logout().await?;
        ctx.ensure(!base.is_user_logged_in().await, "banner should be gone after logout")
    })
}

fn close_modal<'c>(ctx: &'c ScenarioContext<'_>) -> BoxFuture<'c, ProbeResult<()>> {
    Box::pin(async move {
        let pages = ctx.pages();
        let login = pages.login();
        login.open().await?;
        ctx.ensure(login.is_form_visible().await, "login form should be open")?;
        login.close_login_modal().await?;
        ctx.ensure(!login.is_form_visible().await, "login form should be closed")?;
        ctx.ensure(pages.home().is_carousel_visible().await, "carousel should show")?;
        ctx.ensure(!pages.base().is_user_logged_in().await, "nobody should be logged in")
    })
}

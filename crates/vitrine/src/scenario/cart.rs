use super::{Scenario, ScenarioContext};
use crate::data::ProductRef;
use crate::pages::AddToCartOutcome;
use crate::result::{ProbeError, ProbeResult};
use futures::future::BoxFuture;

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "cart.add_as_guest",
            "should add a product to cart as a guest user",
            add_as_guest,
        ),
        Scenario::new(
            "cart.add_multiple",
            "should add multiple products to cart",
            add_multiple,
        ),
        Scenario::new(
            "cart.keep_after_login",
            "should keep cart items after login",
            keep_after_login,
        ),
        Scenario::new(
            "cart.remove_item",
            "should be able to remove items from cart",
            remove_item,
        ),
        Scenario::new(
            "cart.total_price",
            "should calculate correct total price in cart",
            total_price,
        ),
        Scenario::new(
            "cart.persist_after_refresh",
            "should persist cart items after page refresh",
            persist_after_refresh,
        ),
    ]
}

/// Browse to a product and add it to the cart
async fn add_product(ctx: &ScenarioContext<'_>, product: &ProductRef) -> ProbeResult<AddToCartOutcome> {
    let home = ctx.pages().home();
    home.select_category(product.category).await?;
    home.select_product(&product.name).await?;
    ctx.pages().product().add_to_cart().await
}

fn add_as_guest<'c>(ctx: &'c ScenarioContext<'_>) -> BoxFuture<'c, ProbeResult<()>> {
    Box::pin(async move {
        let phone = &ctx.data().products.phone;
        let added = add_product(ctx, phone).await?;
        ctx.ensure(added.success, "add to cart should be confirmed")?;
        ctx.ensure(
            added.message.contains("Product added"),
            format!("unexpected alert {:?}", added.message),
        )?;

        let cart = ctx.pages().cart();
        cart.open().await?;
        ctx.ensure(
            cart.contains_product(&phone.name).await?,
            format!("{} should be in the cart", phone.name),
        )?;
        ctx.ensure_eq(cart.items_count().await?, 1, "cart rows")
    })
}

fn add_multiple<'c>(ctx: &'c ScenarioContext<'_>) -> BoxFuture<'c, ProbeResult<()>> {
    Box::pin(async move {
        let products = &ctx.data().products;
        add_product(ctx, &products.phone).await?;
        ctx.pages().base().navigate_to_home().await?;
        add_product(ctx, &products.laptop).await?;

        let cart = ctx.pages().cart();
        cart.open().await?;
        ctx.ensure_eq(cart.items().await?.len(), 2, "cart rows")?;
        for product in [&products.phone, &products.laptop] {
            ctx.ensure(
                cart.contains_product(&product.name).await?,
                format!("{} should be in the cart", product.name),
            )?;
        }
        Ok(())
    })
}

fn keep_after_login<'c>(ctx: &'c ScenarioContext<'_>) -> BoxFuture<'c, ProbeResult<()>> {
    Box::pin(async move {
        let phone = &ctx.data().products.phone;
        add_product(ctx, phone).await?;
        ctx.pages().login().login(&ctx.data().valid_user).await?;

        let cart = ctx.pages().cart();
        cart.open().await?;
        ctx.ensure(
            cart.contains_product(&phone.name).await?,
            format!("{} should survive login", phone.name),
        )?;
        ctx.ensure_eq(cart.items_count().await?, 1, "cart rows")
    })
}

fn remove_item<'c>(ctx: &'c ScenarioContext<'_>) -> BoxFuture<'c, ProbeResult<()>> {
    Box::pin(async move {
        add_product(ctx, &ctx.data().products.phone).await?;

        let cart = ctx.pages().cart();
        cart.open().await?;
        ctx.ensure_eq(cart.items_count().await?, 1, "cart rows before delete")?;
        ctx.ensure(cart.delete_item(0).await?, "delete should remove the row")?;
        ctx.ensure_eq(cart.items_count().await?, 0, "cart rows after delete")
    })
}

fn total_price<'c>(ctx: &'c ScenarioContext<'_>) -> BoxFuture<'c, ProbeResult<()>> {
    Box::pin(async move {
        let products = &ctx.data().products;
        let home = ctx.pages().home();
        let product = ctx.pages().product();
        let mut expected = 0;

        for (i, item) in [&products.phone, &products.laptop].into_iter().enumerate() {
            if i > 0 {
                ctx.pages().base().navigate_to_home().await?;
            }
            home.select_category(item.category).await?;
            home.select_product(&item.name).await?;
            let details = product.details().await?;
            expected += details.price_value().ok_or_else(|| {
                ProbeError::assertion(format!("price label {:?} has no digits", details.price))
            })?;
            product.add_to_cart().await?;
        }

        let cart = ctx.pages().cart();
        cart.open().await?;
        ctx.ensure_eq(cart.total_price().await?, expected.to_string(), "cart total")
    })
}

fn persist_after_refresh<'c>(ctx: &'c ScenarioContext<'_>) -> BoxFuture<'c, ProbeResult<()>> {
    Box::pin(async move {
        let phone = &ctx.data().products.phone;
        add_product(ctx, phone).await?;

        let cart = ctx.pages().cart();
        cart.open().await?;
        ctx.ensure_eq(cart.items_count().await?, 1, "cart rows before reload")?;

        ctx.pages().session.reload().await?;
        ctx.ensure_eq(cart.items_count().await?, 1, "cart rows after reload")?;
        ctx.ensure(
            cart.contains_product(&phone.name).await?,
            format!("{} should survive reload", phone.name),
        )
    })
}

use super::{parse_price, PageContext};
use crate::locator::Locator;
use crate::result::ProbeResult;
use crate::step::VerifiedStep;
use crate::wait::await_condition;
use serde::Serialize;
use tracing::{debug, info, warn};

/// One row of the cart table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    /// Product name
    pub title: String,
    /// Price cell text
    pub price: String,
}

/// Cart page
#[derive(Debug, Clone, Copy)]
pub struct CartPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> CartPage<'a> {
    /// Wrap a context
    #[must_use]
    pub fn new(ctx: PageContext<'a>) -> Self {
        Self { ctx }
    }

    /// Open the cart from the navigation bar
    pub async fn open(&self) -> ProbeResult<()> {
        self.ctx.base().navigate_to_cart().await
    }

    /// Give freshly opened cart rows time to render.
    ///
    /// Advisory: an empty cart is a valid state, so running out of budget is
    /// not an error.
    async fn await_rows(&self) {
        let session = self.ctx.session;
        let rows = Locator::from(self.ctx.selectors.cart.rows.clone());
        let poll = await_condition(
            || {
                let query = session.count(&rows);
                async move { query.await.map(|n| n > 0) }
            },
            &self.ctx.waits.cart_rows(),
        )
        .await;
        if !poll.succeeded {
            debug!(waited = ?poll.elapsed, "cart shows no rows");
        }
    }

    /// Number of rows, after waiting for them to load
    pub async fn items_count(&self) -> ProbeResult<usize> {
        self.await_rows().await;
        self.ctx.element(&self.ctx.selectors.cart.rows).count().await
    }

    /// Title and price of every row, in table order
    pub async fn items(&self) -> ProbeResult<Vec<CartItem>> {
        self.await_rows().await;
        let cart = &self.ctx.selectors.cart;
        let rows = self.ctx.element(&cart.rows);
        let count = rows.count().await?;

        let mut items = Vec::with_capacity(count);
        for i in 0..count {
            let row = rows.nth(i);
            let title = row.locator(cart.row_title.clone()).read_text().await?;
            let price = row.locator(cart.row_price.clone()).read_text().await?;
            items.push(CartItem {
                title: title.trim().to_string(),
                price: price.trim().to_string(),
            });
        }
        Ok(items)
    }

    /// Whether any row's title contains `name`
    pub async fn contains_product(&self, name: &str) -> ProbeResult<bool> {
        Ok(self
            .items()
            .await?
            .iter()
            .any(|item| item.title.contains(name)))
    }

    /// Delete the `index`-th row and confirm the row count dropped.
    ///
    /// `Ok(false)` if there is no such row, or if the count never dropped
    /// within the deletion budget.
    pub async fn delete_item(&self, index: usize) -> ProbeResult<bool> {
        let session = self.ctx.session;
        let delete = self.ctx.element(&self.ctx.selectors.cart.delete);
        let before = delete.count().await?;
        if before <= index {
            debug!(index, before, "no cart row to delete");
            return Ok(false);
        }

        let links = Locator::from(self.ctx.selectors.cart.delete.clone());
        let mut step = VerifiedStep::new("delete cart item", self.ctx.waits.deletion());
        let target = delete.nth(index);
        let poll = step
            .run(
                || target.click(),
                || {
                    let query = session.count(&links);
                    async move { query.await.map(|after| after < before) }
                },
            )
            .await?;

        if poll.succeeded {
            info!(index, remaining = before - 1, "cart item deleted");
        } else {
            warn!(index, before, "cart row count did not drop after delete");
        }
        Ok(poll.succeeded)
    }

    /// Delete rows until the cart is empty or a deletion makes no progress.
    ///
    /// Returns the number of rows removed.
    pub async fn empty_cart(&self) -> ProbeResult<usize> {
        let mut removed = 0;
        while self.items_count().await? > 0 {
            if !self.delete_item(0).await? {
                break;
            }
            removed += 1;
        }
        Ok(removed)
    }

    /// Text of the total label, trimmed
    pub async fn total_price(&self) -> ProbeResult<String> {
        self.await_rows().await;
        let text = self
            .ctx
            .element(&self.ctx.selectors.cart.total)
            .read_text()
            .await?;
        Ok(text.trim().to_string())
    }

    /// Numeric total, `None` for an empty label
    pub async fn total_price_value(&self) -> ProbeResult<Option<u64>> {
        Ok(parse_price(&self.total_price().await?))
    }
}

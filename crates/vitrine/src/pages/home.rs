use super::PageContext;
use crate::data::Category;
use crate::locator::Locator;
use crate::result::ProbeResult;
use crate::wait::await_condition;
use tracing::{debug, warn};

/// Home page: category menu and product grid
#[derive(Debug, Clone, Copy)]
pub struct HomePage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> HomePage<'a> {
    /// Wrap a context
    #[must_use]
    pub fn new(ctx: PageContext<'a>) -> Self {
        Self { ctx }
    }

    /// Filter the catalog by category.
    ///
    /// Waits for product cards to be listed rather than for a fixed time.
    /// An empty grid after the catalog budget is logged, not raised.
    pub async fn select_category(&self, category: Category) -> ProbeResult<()> {
        let home = &self.ctx.selectors.home;
        self.ctx
            .element(&home.category.render(category.label()))
            .click()
            .await?;

        let session = self.ctx.session;
        let cards = Locator::from(home.product_cards.clone());
        let poll = await_condition(
            || {
                let query = session.count(&cards);
                async move { query.await.map(|n| n > 0) }
            },
            &self.ctx.waits.catalog(),
        )
        .await;

        if poll.succeeded {
            debug!(%category, attempts = poll.attempts, "category listed");
        } else {
            warn!(%category, "no products listed after selecting category");
        }
        Ok(())
    }

    /// Open a product page by its exact name
    pub async fn select_product(&self, name: &str) -> ProbeResult<()> {
        let link = self.ctx.selectors.home.product_link.render(name);
        self.ctx.element(&link).click().await?;
        self.ctx.base().wait_for_page_load().await
    }

    /// Number of product cards currently listed
    pub async fn product_count(&self) -> ProbeResult<usize> {
        self.ctx
            .element(&self.ctx.selectors.home.product_cards)
            .count()
            .await
    }

    /// Whether the landing carousel is visible
    pub async fn is_carousel_visible(&self) -> bool {
        self.ctx
            .element(&self.ctx.selectors.home.carousel)
            .is_visible(&self.ctx.waits.visibility())
            .await
    }
}

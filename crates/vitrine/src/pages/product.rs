use super::{parse_price, PageContext};
use crate::locator::{Locator, Selector};
use crate::result::ProbeResult;
use crate::signal::{capture_during, SignalKind};
use crate::wait::wait_until;
use serde::Serialize;
use tracing::{info, warn};

/// Text shown on the product page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetails {
    /// Product name
    pub title: String,
    /// Description paragraph
    pub description: String,
    /// Price label, e.g. `$360 *includes tax`
    pub price: String,
}

impl ProductDetails {
    /// Numeric price
    #[must_use]
    pub fn price_value(&self) -> Option<u64> {
        parse_price(&self.price)
    }
}

/// Result of clicking "Add to cart"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddToCartOutcome {
    /// The store confirmed the addition
    pub success: bool,
    /// Alert text, empty if no alert arrived
    pub message: String,
}

/// Product detail page
#[derive(Debug, Clone, Copy)]
pub struct ProductPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> ProductPage<'a> {
    /// Wrap a context
    #[must_use]
    pub fn new(ctx: PageContext<'a>) -> Self {
        Self { ctx }
    }

    /// Title, description and price once the title is visible
    pub async fn details(&self) -> ProbeResult<ProductDetails> {
        let product = &self.ctx.selectors.product;
        let session = self.ctx.session;
        let title = Locator::from(product.title.clone());
        wait_until(
            "product title",
            || session.is_visible_now(&title),
            &self.ctx.waits.action(),
        )
        .await?;

        Ok(ProductDetails {
            title: self.read(&product.title).await?,
            description: self.read(&product.description).await?,
            price: self.read(&product.price).await?,
        })
    }

    async fn read(&self, selector: &Selector) -> ProbeResult<String> {
        Ok(self.ctx.element(selector).read_text().await?.trim().to_string())
    }

    /// Click "Add to cart" and capture the confirmation alert.
    ///
    /// A missing alert is reported as an unsuccessful outcome after the alert
    /// budget, never as a hang.
    pub async fn add_to_cart(&self) -> ProbeResult<AddToCartOutcome> {
        let button = self.ctx.element(&self.ctx.selectors.product.add_to_cart);
        let event = capture_during(
            self.ctx.session,
            SignalKind::Dialog,
            || button.click(),
            self.ctx.waits.alert(),
        )
        .await?;

        if event.timed_out {
            warn!(
                timeout_ms = self.ctx.waits.alert_ms,
                "no confirmation alert after add to cart"
            );
        }
        let outcome = AddToCartOutcome {
            success: event.contains("Product added"),
            message: event.message().to_string(),
        };
        info!(success = outcome.success, "add to cart");
        Ok(outcome)
    }
}

//! Three-stage checkout: add to cart, shipping quote, order placement.
//!
//! Stages run strictly in sequence and thread the cart token and shipping
//! handle forward. A failed stage is recorded and logged but does not stop
//! the stages after it: a failed add-to-cart still produces shipping and
//! order calls against the empty cart token `/sf/checkout//...`, which the
//! storefront then rejects. Callers see the result through
//! [`CheckoutOutcome::checkout_url`] being `None`.

mod form;
mod stages;

use peak_core::{SiteConfig, Task};
use tracing::{info, warn};

use crate::error::StorefrontError;
use crate::session::Session;
use crate::types::Variant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStage {
    AddToCart,
    ShippingQuote,
    OrderPlacement,
}

impl CheckoutStage {
    pub(crate) fn failed(self, reason: impl std::fmt::Display) -> StorefrontError {
        StorefrontError::StageFailed {
            stage: self,
            reason: reason.to_string(),
        }
    }
}

impl std::fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckoutStage::AddToCart => write!(f, "add to cart"),
            CheckoutStage::ShippingQuote => write!(f, "shipping quote"),
            CheckoutStage::OrderPlacement => write!(f, "order placement"),
        }
    }
}

/// What one pipeline run produced.
#[derive(Debug, Default)]
pub struct CheckoutOutcome {
    /// Empty when add-to-cart failed.
    pub cart_token: String,
    /// Empty when the shipping quote failed.
    pub shipping_handle: String,
    /// Payment redirect; the checkout result.
    pub checkout_url: Option<String>,
    /// Every stage failure, in stage order.
    pub failures: Vec<StorefrontError>,
}

impl CheckoutOutcome {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.checkout_url.is_some()
    }

    /// The checkout link as reported to the operator; empty on failure.
    #[must_use]
    pub fn checkout_link(&self) -> &str {
        self.checkout_url.as_deref().unwrap_or_default()
    }
}

/// Checkout for one task, using the task's own session and cookie jar.
pub struct CheckoutPipeline<'a> {
    session: &'a Session,
    site: &'a SiteConfig,
    task: &'a Task,
}

impl<'a> CheckoutPipeline<'a> {
    #[must_use]
    pub fn new(session: &'a Session, site: &'a SiteConfig, task: &'a Task) -> Self {
        Self {
            session,
            site,
            task,
        }
    }

    /// Runs all three stages for `variant` and never fails as a whole.
    pub async fn run(&self, variant: &Variant) -> CheckoutOutcome {
        let client = self.session.client();
        let base = self.site.base_url();
        let token = self.session.anti_forgery_token().unwrap_or_default();
        let mut outcome = CheckoutOutcome::default();

        let cart = stages::add_to_cart(client, base, token, variant.id, self.task.quantity).await;
        match cart {
            Ok(cart) => {
                for item in &cart.items {
                    info!(
                        task = self.task.number(),
                        site = %self.task.site,
                        product = %item.product_name,
                        variant = %item.variant_name,
                        quantity = item.quantity,
                        "carted"
                    );
                }
                outcome.cart_token = cart.token;
            }
            Err(e) => self.record(&mut outcome, e),
        }

        let form = form::shipping_quote_form(token, self.task);
        let quote = stages::shipping_quote(client, base, token, &outcome.cart_token, &form).await;
        match quote {
            Ok(method) => {
                info!(
                    task = self.task.number(),
                    site = %self.task.site,
                    handle = %method.handle,
                    title = method.title.as_deref().unwrap_or_default(),
                    "shipping rate selected"
                );
                outcome.shipping_handle = method.handle;
            }
            Err(e) => self.record(&mut outcome, e),
        }

        let form =
            form::order_placement_form(token, self.task, self.site, &outcome.shipping_handle);
        let order = stages::place_order(client, base, token, &outcome.cart_token, &form).await;
        match order {
            Ok(url) if !url.is_empty() => outcome.checkout_url = Some(url),
            Ok(_) => self.record(
                &mut outcome,
                CheckoutStage::OrderPlacement.failed("response carried no redirect URL"),
            ),
            Err(e) => self.record(&mut outcome, e),
        }

        outcome
    }

    fn record(&self, outcome: &mut CheckoutOutcome, error: StorefrontError) {
        warn!(
            task = self.task.number(),
            site = %self.task.site,
            error = %error,
            "checkout stage failed"
        );
        outcome.failures.push(error);
    }
}

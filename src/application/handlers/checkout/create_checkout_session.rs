//! CreateCheckoutSessionHandler - Command handler for starting a checkout.
//!
//! Validates the cart against the catalog, records a PENDING order with
//! price snapshots, then opens a hosted payment session for it.
//!
//! Stock is only checked here, never reserved. Two concurrent checkouts can
//! both pass the check for the last unit; the oversell surfaces when the
//! second payment is confirmed and stock goes negative. This is an accepted
//! business risk.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::config::PaymentConfig;
use crate::domain::catalog::Product;
use crate::domain::errors::StoreError;
use crate::domain::foundation::{OrderId, ProductId};
use crate::domain::order::{CartLine, CustomerEmail, Order};
use crate::ports::{
    CatalogRepository, CheckoutLineItem, CheckoutSessionRequest, OrderRepository, PaymentGateway,
};

/// Command to start checkout for a cart.
#[derive(Debug, Clone)]
pub struct CreateCheckoutSessionCommand {
    pub items: Vec<CartLine>,
    pub customer_email: CustomerEmail,
}

/// Result of a successful checkout start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCheckoutSessionResult {
    /// Hosted payment page to redirect the shopper to.
    pub url: String,
    pub session_id: String,
    pub order_id: OrderId,
}

/// Redirect targets handed to the payment provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRedirects {
    pub success_url: String,
    pub cancel_url: String,
}

impl From<&PaymentConfig> for CheckoutRedirects {
    fn from(config: &PaymentConfig) -> Self {
        Self {
            success_url: config.success_url(),
            cancel_url: config.cancel_url(),
        }
    }
}

/// Handler for creating checkout sessions.
pub struct CreateCheckoutSessionHandler {
    catalog: Arc<dyn CatalogRepository>,
    orders: Arc<dyn OrderRepository>,
    gateway: Arc<dyn PaymentGateway>,
    redirects: CheckoutRedirects,
}

impl CreateCheckoutSessionHandler {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        orders: Arc<dyn OrderRepository>,
        gateway: Arc<dyn PaymentGateway>,
        redirects: CheckoutRedirects,
    ) -> Self {
        Self {
            catalog,
            orders,
            gateway,
            redirects,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateCheckoutSessionCommand,
    ) -> Result<CreateCheckoutSessionResult, StoreError> {
        if cmd.items.is_empty() {
            return Err(StoreError::validation("items must be a non-empty array"));
        }
        if cmd.items.iter().any(|line| line.quantity < 1) {
            return Err(StoreError::validation("each item quantity must be >= 1"));
        }

        // 1. Load every referenced product that can still be sold
        let products = self.load_products(&cmd.items).await?;

        // 2. Advisory stock check, line by line
        for line in &cmd.items {
            let product = &products[&line.product_id];
            if !product.has_stock_for(line.quantity) {
                return Err(StoreError::validation(format!(
                    "Insufficient stock for product: {}",
                    product.name
                )));
            }
        }

        // 3. Build and persist the PENDING order with server-side prices
        let lines: Vec<(&Product, i32)> = cmd
            .items
            .iter()
            .map(|line| (&products[&line.product_id], line.quantity))
            .collect();
        let currency = lines[0].0.currency.clone();
        let order = Order::pending(cmd.customer_email, currency, lines.iter().copied())?;
        self.orders.create(&order).await?;

        tracing::info!(
            order_id = %order.id,
            total_amount = order.total_amount,
            currency = %order.currency,
            "Pending order created"
        );

        // 4. Open the hosted payment session
        let request = CheckoutSessionRequest {
            order_id: order.id,
            customer_email: order.customer_email.as_str().to_string(),
            line_items: lines
                .iter()
                .map(|(product, quantity)| CheckoutLineItem {
                    name: product.name.clone(),
                    description: product.description.clone(),
                    image_url: product.image_url.clone(),
                    currency: product.currency.clone(),
                    unit_amount: product.price,
                    quantity: *quantity,
                })
                .collect(),
            success_url: self.redirects.success_url.clone(),
            cancel_url: self.redirects.cancel_url.clone(),
        };

        let session = self
            .gateway
            .create_checkout_session(request)
            .await
            .map_err(|e| {
                tracing::error!(order_id = %order.id, error = %e, "Checkout session creation failed");
                StoreError::from(e)
            })?;

        // 5. Link the session so webhooks and support can find the order
        self.orders.attach_session(&order.id, &session.id).await?;

        tracing::info!(order_id = %order.id, session_id = %session.id, "Checkout session attached");

        Ok(CreateCheckoutSessionResult {
            url: session.url,
            session_id: session.id,
            order_id: order.id,
        })
    }

    /// Active products keyed by id. Fails unless every distinct id resolves.
    async fn load_products(
        &self,
        items: &[CartLine],
    ) -> Result<HashMap<ProductId, Product>, StoreError> {
        let ids: Vec<ProductId> = items
            .iter()
            .map(|line| line.product_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let products: HashMap<ProductId, Product> = self
            .catalog
            .find_many_by_ids(&ids, true)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        if ids.iter().any(|id| !products.contains_key(id)) {
            return Err(StoreError::validation(
                "One or more products not found or inactive",
            ));
        }

        Ok(products)
    }
}

//! Stripe checkout and order fulfilment.
//!
//! A checkout only creates a Stripe session; the order is written when the
//! `checkout.session.completed` webhook arrives.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{
    Config, SHIPPING_FEE_CENTS, SHIPPING_FEE_LABEL, STRIPE_EVENT_CHECKOUT_COMPLETED,
    STRIPE_EVENT_PAYMENT_FAILED,
};
use crate::domain::{Cart, CheckoutRecord, NewOrder, OrderStatus, Product};
use crate::errors::{AppError, AppResult};
use crate::infra::stripe::verify_webhook_signature;
use crate::infra::{
    CatalogCache, CheckoutLine, CheckoutRequest, CheckoutSession, PaymentGateway, UnitOfWork,
    WebhookEvent,
};

const OUT_OF_STOCK: &str = "One or more products are out of stock";

/// Where and how to reach the buyer
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutContact {
    pub email: String,
    pub phone: String,
    pub destination: String,
}

/// Created checkout session
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CheckoutResponse {
    #[schema(example = "cs_test_a1b2c3")]
    pub id: String,
    /// Hosted checkout page
    pub url: Option<String>,
}

#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Price a cart and open a checkout session for it.
    async fn create_checkout(
        &self,
        cart: Cart,
        contact: CheckoutContact,
        player: Option<Uuid>,
    ) -> AppResult<CheckoutResponse>;

    /// Verify and apply a Stripe webhook. Returns the acknowledgement text.
    async fn handle_webhook(&self, payload: &[u8], signature: Option<String>) -> AppResult<String>;

    /// Confirm a checkout session has been paid.
    async fn verify_success(&self, session_id: &str) -> AppResult<String>;
}

pub struct PaymentManager<U: UnitOfWork> {
    uow: Arc<U>,
    gateway: Arc<dyn PaymentGateway>,
    cache: Arc<dyn CatalogCache>,
    config: Config,
}

impl<U: UnitOfWork> PaymentManager<U> {
    pub fn new(
        uow: Arc<U>,
        gateway: Arc<dyn PaymentGateway>,
        cache: Arc<dyn CatalogCache>,
        config: Config,
    ) -> Self {
        Self {
            uow,
            gateway,
            cache,
            config,
        }
    }

    async fn fulfil(&self, session: CheckoutSession) -> AppResult<String> {
        let email = session
            .meta("email")
            .ok_or_else(|| AppError::bad_request("Email is required."))?
            .to_string();
        let destination = session
            .meta("destination")
            .ok_or_else(|| AppError::bad_request("Destination is required."))?
            .to_string();
        let phone = session.meta("phone").unwrap_or_default().to_string();
        let buyer = session
            .meta("uuid")
            .map(|raw| {
                Uuid::parse_str(raw)
                    .map_err(|_| AppError::bad_request(format!("Invalid player UUID: {}", raw)))
            })
            .transpose()?;

        // Stripe retries deliveries; a session pays for one order only
        if let Some(existing) = self.uow.orders().find_by_transaction(&session.id).await? {
            tracing::info!(order_id = existing.id, session = %session.id, "Checkout already fulfilled");
            return Ok(format!("Order created with ID: {}", existing.id));
        }

        let cart = Cart::from_metadata(session.meta("cart").unwrap_or("{}"))?;
        let units = cart.expand()?;
        let ids: Vec<i64> = units.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let virtual_by_id: HashMap<i64, bool> = self
            .uow
            .products()
            .find_many(ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p.is_virtual))
            .collect();

        let stock_reductions: Vec<i64> = units
            .iter()
            .copied()
            .filter(|id| virtual_by_id.get(id) == Some(&false))
            .collect();
        let wardrobe_grants: Vec<i64> = virtual_by_id
            .iter()
            .filter(|(_, is_virtual)| **is_virtual)
            .map(|(id, _)| *id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let order = self
            .uow
            .orders()
            .record_checkout(CheckoutRecord {
                order: NewOrder {
                    uuid: buyer,
                    cart: units,
                    destination,
                    phone,
                    email,
                    status: OrderStatus::Pending,
                    transaction: Some(session.id.clone()),
                },
                stock_reductions,
                wardrobe_grants,
            })
            .await?;

        self.cache.invalidate_catalog().await;
        tracing::info!(order_id = order.id, session = %session.id, "Order created from checkout");
        Ok(format!("Order created with ID: {}", order.id))
    }
}

/// Checkout lines for a cart, plus whether it holds physical and virtual goods.
fn price_cart(
    entries: &[(i64, i64)],
    products: &HashMap<i64, Product>,
    stock: &HashMap<i64, i64>,
) -> AppResult<(Vec<CheckoutLine>, bool, bool)> {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    let mut has_physical = false;
    let mut has_virtual = false;

    for (id, quantity) in entries {
        let product = products
            .get(id)
            .ok_or_else(|| AppError::bad_request(format!("Invalid product ID: {}", id)))?;

        if product.is_virtual {
            has_virtual = true;
        } else {
            has_physical = true;
            if stock.get(id).copied().unwrap_or(0) < *quantity {
                return Err(AppError::bad_request(OUT_OF_STOCK));
            }
        }

        lines.push(CheckoutLine {
            name: product.line_item_name(),
            unit_amount: product.unit_amount(),
            quantity: *quantity,
        });
    }

    if has_physical {
        lines.push(CheckoutLine {
            name: SHIPPING_FEE_LABEL.to_string(),
            unit_amount: SHIPPING_FEE_CENTS,
            quantity: 1,
        });
    }

    Ok((lines, has_physical, has_virtual))
}

#[async_trait]
impl<U: UnitOfWork> PaymentService for PaymentManager<U> {
    async fn create_checkout(
        &self,
        cart: Cart,
        contact: CheckoutContact,
        player: Option<Uuid>,
    ) -> AppResult<CheckoutResponse> {
        if contact.email.trim().is_empty() {
            return Err(AppError::bad_request("Email is required."));
        }
        if contact.destination.trim().is_empty() {
            return Err(AppError::bad_request("Destination is required."));
        }
        if cart.is_empty() {
            return Err(AppError::bad_request("Cart is empty"));
        }

        let entries = cart.entries()?;
        let ids: Vec<i64> = entries.iter().map(|(id, _)| *id).collect();

        let products: HashMap<i64, Product> = self
            .uow
            .products()
            .find_many(ids.clone())
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let stock: HashMap<i64, i64> = self
            .uow
            .stocks()
            .list_for_products(ids)
            .await?
            .into_iter()
            .map(|s| (s.product_id, s.quantity))
            .collect();

        let (lines, _, has_virtual) = price_cart(&entries, &products, &stock)?;

        if has_virtual && player.is_none() {
            return Err(AppError::Unauthorized);
        }

        let mut metadata = BTreeMap::new();
        if let Some(uuid) = player {
            metadata.insert("uuid".to_string(), uuid.to_string());
        }
        metadata.insert("cart".to_string(), cart.to_metadata()?);
        metadata.insert("email".to_string(), contact.email);
        metadata.insert("phone".to_string(), contact.phone);
        metadata.insert("destination".to_string(), contact.destination);

        let frontend = &self.config.frontend_domain;
        let session = self
            .gateway
            .create_checkout_session(CheckoutRequest {
                lines,
                metadata,
                success_url: format!(
                    "{}/orders?checkout=success&session_id={{CHECKOUT_SESSION_ID}}",
                    frontend
                ),
                cancel_url: format!("{}/store", frontend),
            })
            .await?;

        tracing::info!(session = %session.id, player = ?player, "Checkout session created");
        Ok(CheckoutResponse {
            id: session.id,
            url: session.url,
        })
    }

    async fn handle_webhook(&self, payload: &[u8], signature: Option<String>) -> AppResult<String> {
        let signature = signature
            .ok_or_else(|| AppError::bad_request("Webhook signature verification failed."))?;
        verify_webhook_signature(
            payload,
            &signature,
            self.config.stripe_webhook_secret(),
            Utc::now().timestamp(),
        )?;

        let event = WebhookEvent::parse(payload)?;
        match event.kind.as_str() {
            STRIPE_EVENT_CHECKOUT_COMPLETED => self.fulfil(event.checkout_session()?).await,
            STRIPE_EVENT_PAYMENT_FAILED => {
                let intent = event.data.object.get("id").and_then(|id| id.as_str());
                tracing::warn!(payment_intent = ?intent, "Payment failed");
                Ok("Payment failed.".to_string())
            }
            other => {
                tracing::debug!(event = %other, "Ignoring webhook event");
                Ok(format!("Unhandled event type: {}", other))
            }
        }
    }

    async fn verify_success(&self, session_id: &str) -> AppResult<String> {
        if session_id.trim().is_empty() {
            return Err(AppError::bad_request("Missing session ID"));
        }

        let session = self.gateway.retrieve_checkout_session(session_id).await?;
        if !session.is_complete() {
            return Err(AppError::bad_request("Payment incomplete"));
        }
        Ok("Payment verified".to_string())
    }
}

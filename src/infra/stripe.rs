//! Stripe checkout client and webhook verification.
//!
//! Talks to the Stripe REST API directly with `reqwest` form requests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::config::{Config, CHECKOUT_CURRENCY, STRIPE_SIGNATURE_TOLERANCE_SECONDS};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_FAILED: &str = "Webhook signature verification failed.";

/// One priced line of a checkout
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutLine {
    pub name: String,
    /// Price per unit in cents
    pub unit_amount: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub lines: Vec<CheckoutLine>,
    pub metadata: BTreeMap<String, String>,
    pub success_url: String,
    pub cancel_url: String,
}

/// The parts of a Stripe checkout session the shop reads
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    /// `open`, `complete` or `expired`
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    pub fn is_complete(&self) -> bool {
        self.status.as_deref() == Some("complete")
    }

    /// Non-blank metadata value
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(&self, request: CheckoutRequest) -> AppResult<CheckoutSession>;

    async fn retrieve_checkout_session(&self, session_id: &str) -> AppResult<CheckoutSession>;
}

pub struct StripeClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl StripeClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.stripe_api_base.trim_end_matches('/').to_string(),
            api_key: config.stripe_api_key().to_string(),
        }
    }

    async fn parse_session(response: reqwest::Response) -> AppResult<CheckoutSession> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!("Stripe returned {}: {}", status, body)));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_checkout_session(&self, request: CheckoutRequest) -> AppResult<CheckoutSession> {
        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.api_key)
            .form(&checkout_form(&request))
            .send()
            .await?;

        Self::parse_session(response).await
    }

    async fn retrieve_checkout_session(&self, session_id: &str) -> AppResult<CheckoutSession> {
        let response = self
            .http
            .get(format!("{}/v1/checkout/sessions/{}", self.api_base, session_id))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        Self::parse_session(response).await
    }
}

/// Flatten a checkout into Stripe's bracketed form encoding.
pub fn checkout_form(request: &CheckoutRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];

    for (i, line) in request.lines.iter().enumerate() {
        let prefix = format!("line_items[{}]", i);
        form.push((
            format!("{}[price_data][currency]", prefix),
            CHECKOUT_CURRENCY.to_string(),
        ));
        form.push((
            format!("{}[price_data][product_data][name]", prefix),
            line.name.clone(),
        ));
        form.push((
            format!("{}[price_data][unit_amount]", prefix),
            line.unit_amount.to_string(),
        ));
        form.push((format!("{}[quantity]", prefix), line.quantity.to_string()));
    }

    for (key, value) in &request.metadata {
        form.push((format!("metadata[{}]", key), value.clone()));
    }

    form
}

/// Check a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=...]`) against
/// the raw request body.
pub fn verify_webhook_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> AppResult<()> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<Vec<u8>> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| AppError::bad_request(SIGNATURE_FAILED))?;
    if now.abs_diff(timestamp) > STRIPE_SIGNATURE_TOLERANCE_SECONDS {
        return Err(AppError::bad_request(SIGNATURE_FAILED));
    }

    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::internal(format!("Webhook key rejected: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = signatures
        .iter()
        .any(|signature| mac.clone().verify_slice(signature).is_ok());
    if matched {
        Ok(())
    } else {
        Err(AppError::bad_request(SIGNATURE_FAILED))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

impl WebhookEvent {
    pub fn parse(payload: &[u8]) -> AppResult<Self> {
        serde_json::from_slice(payload)
            .map_err(|e| AppError::bad_request(format!("Invalid webhook payload: {}", e)))
    }

    /// The event object read as a checkout session
    pub fn checkout_session(&self) -> AppResult<CheckoutSession> {
        serde_json::from_value(self.data.object.clone())
            .map_err(|e| AppError::bad_request(format!("Invalid checkout session: {}", e)))
    }
}

//! Stripe checkout handlers.

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::{MaybePlayer, QueryParams, ValidatedJson};
use crate::api::AppState;
use crate::config::STRIPE_SIGNATURE_HEADER;
use crate::domain::Cart;
use crate::errors::AppResult;
use crate::services::{CheckoutContact, CheckoutResponse};

/// Cart and delivery details for a checkout
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCheckoutRequest {
    /// Product id to `{"quantity": n}`
    #[schema(value_type = Object, example = json!({"12": {"quantity": 2}}))]
    pub cart: Cart,
    #[serde(default)]
    #[schema(example = "steve@example.com")]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Shipping address
    #[serde(default)]
    pub destination: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SuccessQuery {
    pub session_id: Option<String>,
}

/// Create payment routes
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_checkout))
        .route("/webhook", post(webhook))
        .route("/success", get(verify_success))
}

/// Open a Stripe checkout session for a cart
#[utoipa::path(
    post,
    path = "/api/payment/create",
    tag = "Payment",
    request_body = CreateCheckoutRequest,
    responses(
        (status = 200, description = "Checkout session created", body = CheckoutResponse),
        (status = 400, description = "Invalid cart, contact details or stock"),
        (status = 401, description = "Virtual products need a signed-in player"),
        (status = 502, description = "Stripe failed")
    )
)]
pub async fn create_checkout(
    State(state): State<AppState>,
    MaybePlayer(player): MaybePlayer,
    ValidatedJson(payload): ValidatedJson<CreateCheckoutRequest>,
) -> AppResult<Json<CheckoutResponse>> {
    let contact = CheckoutContact {
        email: payload.email,
        phone: payload.phone,
        destination: payload.destination,
    };

    let checkout = state
        .services
        .payments()
        .create_checkout(payload.cart, contact, player)
        .await?;
    Ok(Json(checkout))
}

/// Stripe webhook
#[utoipa::path(
    post,
    path = "/api/payment/webhook",
    tag = "Payment",
    request_body(content = String, description = "Raw Stripe event", content_type = "application/json"),
    responses(
        (status = 200, description = "Event acknowledged", body = String),
        (status = 400, description = "Webhook signature verification failed.")
    )
)]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<String> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    state
        .services
        .payments()
        .handle_webhook(&body, signature)
        .await
}

/// Confirm a checkout was paid
#[utoipa::path(
    get,
    path = "/api/payment/success",
    tag = "Payment",
    params(SuccessQuery),
    responses(
        (status = 200, description = "Payment verified", body = String),
        (status = 400, description = "Missing session ID or payment incomplete")
    )
)]
pub async fn verify_success(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SuccessQuery>,
) -> AppResult<String> {
    let session_id = query.session_id.unwrap_or_default();
    state.services.payments().verify_success(&session_id).await
}

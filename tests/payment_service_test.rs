//! Checkout and webhook fulfilment tests.

mod common;

use std::sync::Arc;

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use common::{order, product, stock, TestUnitOfWork};
use merch_api::config::{Config, SHIPPING_FEE_CENTS};
use merch_api::domain::{Cart, CheckoutRecord};
use merch_api::errors::AppError;
use merch_api::infra::{CheckoutRequest, CheckoutSession, MockCatalogCache, MockPaymentGateway};
use merch_api::services::{CheckoutContact, PaymentManager, PaymentService};

fn contact() -> CheckoutContact {
    CheckoutContact {
        email: "steve@example.com".to_string(),
        phone: "600000000".to_string(),
        destination: "Main St 1".to_string(),
    }
}

fn manager(
    uow: TestUnitOfWork,
    gateway: MockPaymentGateway,
    cache: MockCatalogCache,
) -> PaymentManager<common::BuiltUnitOfWork> {
    PaymentManager::new(uow.build(), Arc::new(gateway), Arc::new(cache), Config::for_tests())
}

fn sign(payload: &[u8]) -> String {
    let timestamp = Utc::now().timestamp();
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(b"whsec_test").unwrap();
    mac.update(format!("{}.", timestamp).as_bytes());
    mac.update(payload);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

fn completed_event(session_id: &str, buyer: Uuid, cart: &Cart) -> Vec<u8> {
    json!({
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": session_id,
                "status": "complete",
                "metadata": {
                    "uuid": buyer.to_string(),
                    "cart": cart.to_metadata().unwrap(),
                    "email": "steve@example.com",
                    "phone": "",
                    "destination": "Main St 1"
                }
            }
        }
    })
    .to_string()
    .into_bytes()
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_checkout_requires_contact_details() {
    let service = manager(
        TestUnitOfWork::default(),
        MockPaymentGateway::new(),
        MockCatalogCache::new(),
    );
    let cart: Cart = [(1, 1)].into_iter().collect();

    let mut missing_email = contact();
    missing_email.email = "  ".to_string();
    let err = service
        .create_checkout(cart.clone(), missing_email, None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Email is required.");

    let mut missing_destination = contact();
    missing_destination.destination = String::new();
    let err = service
        .create_checkout(cart, missing_destination, None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Destination is required.");

    let err = service
        .create_checkout(Cart::default(), contact(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_checkout_prices_cart_and_adds_shipping() {
    let mut uow = TestUnitOfWork::default();
    uow.products
        .expect_find_many()
        .returning(|_| Ok(vec![product(1, "Hoodie", 35, false)]));
    uow.stocks
        .expect_list_for_products()
        .returning(|_| Ok(vec![stock(1, 5)]));

    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_create_checkout_session()
        .withf(|request: &CheckoutRequest| {
            request.lines.len() == 2
                && request.lines[0].unit_amount == 3500
                && request.lines[0].quantity == 2
                && request.lines[1].unit_amount == SHIPPING_FEE_CENTS
                && request.metadata.get("email").map(String::as_str) == Some("steve@example.com")
                && !request.metadata.contains_key("uuid")
                && request.success_url.starts_with("https://shop.test/orders")
                && request.cancel_url == "https://shop.test/store"
        })
        .times(1)
        .returning(|_| {
            Ok(CheckoutSession {
                id: "cs_test_1".to_string(),
                url: Some("https://checkout.stripe.com/c/cs_test_1".to_string()),
                status: Some("open".to_string()),
                metadata: Default::default(),
            })
        });

    let service = manager(uow, gateway, MockCatalogCache::new());
    let cart: Cart = [(1, 2)].into_iter().collect();

    let response = service.create_checkout(cart, contact(), None).await.unwrap();

    assert_eq!(response.id, "cs_test_1");
    assert!(response.url.unwrap().contains("cs_test_1"));
}

#[tokio::test]
async fn test_checkout_refuses_more_than_stock() {
    let mut uow = TestUnitOfWork::default();
    uow.products
        .expect_find_many()
        .returning(|_| Ok(vec![product(1, "Hoodie", 35, false)]));
    uow.stocks
        .expect_list_for_products()
        .returning(|_| Ok(vec![stock(1, 1)]));

    let service = manager(uow, MockPaymentGateway::new(), MockCatalogCache::new());
    let cart: Cart = [(1, 3)].into_iter().collect();

    let err = service.create_checkout(cart, contact(), None).await.unwrap_err();
    assert_eq!(err.to_string(), "One or more products are out of stock");
}

#[tokio::test]
async fn test_checkout_counts_aliased_cart_keys_against_stock() {
    let mut uow = TestUnitOfWork::default();
    uow.products
        .expect_find_many()
        .returning(|_| Ok(vec![product(1, "Hoodie", 35, false)]));
    uow.stocks
        .expect_list_for_products()
        .returning(|_| Ok(vec![stock(1, 5)]));

    let mut gateway = MockPaymentGateway::new();
    gateway.expect_create_checkout_session().never();

    let service = manager(uow, gateway, MockCatalogCache::new());
    let cart: Cart =
        serde_json::from_str(r#"{"1": {"quantity": 5}, "01": {"quantity": 5}}"#).unwrap();

    let err = service.create_checkout(cart, contact(), None).await.unwrap_err();
    assert_eq!(err.to_string(), "One or more products are out of stock");
}

#[tokio::test]
async fn test_virtual_products_need_signed_in_player() {
    let mut uow = TestUnitOfWork::default();
    uow.products
        .expect_find_many()
        .returning(|_| Ok(vec![product(9, "Top Hat", 5, true)]));
    uow.stocks.expect_list_for_products().returning(|_| Ok(vec![]));

    let service = manager(uow, MockPaymentGateway::new(), MockCatalogCache::new());
    let cart: Cart = [(9, 1)].into_iter().collect();

    let err = service.create_checkout(cart, contact(), None).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));
}

// =============================================================================
// Webhook
// =============================================================================

#[tokio::test]
async fn test_webhook_rejects_missing_or_bad_signature() {
    let service = manager(
        TestUnitOfWork::default(),
        MockPaymentGateway::new(),
        MockCatalogCache::new(),
    );
    let payload = br#"{"type":"checkout.session.completed","data":{"object":{}}}"#;

    let err = service.handle_webhook(payload, None).await.unwrap_err();
    assert_eq!(err.to_string(), "Webhook signature verification failed.");

    let forged = format!("t={},v1=deadbeef", Utc::now().timestamp());
    let err = service.handle_webhook(payload, Some(forged)).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_completed_checkout_records_order() {
    let buyer = Uuid::new_v4();
    let cart: Cart = [(1, 2), (9, 1)].into_iter().collect();
    let payload = completed_event("cs_test_2", buyer, &cart);

    let mut uow = TestUnitOfWork::default();
    uow.orders
        .expect_find_by_transaction()
        .returning(|_| Ok(None));
    uow.products.expect_find_many().returning(|_| {
        Ok(vec![
            product(1, "Hoodie", 35, false),
            product(9, "Top Hat", 5, true),
        ])
    });
    uow.orders
        .expect_record_checkout()
        .withf(move |record: &CheckoutRecord| {
            record.order.uuid == Some(buyer)
                && record.order.cart == vec![1, 1, 9]
                && record.order.transaction.as_deref() == Some("cs_test_2")
                && record.stock_reductions == vec![1, 1]
                && record.wardrobe_grants == vec![9]
        })
        .times(1)
        .returning(move |_| Ok(order(42, Some(buyer), "cs_test_2")));

    let mut cache = MockCatalogCache::new();
    cache.expect_invalidate_catalog().times(1).return_const(());

    let service = manager(uow, MockPaymentGateway::new(), cache);
    let signature = sign(&payload);

    let reply = service.handle_webhook(&payload, Some(signature)).await.unwrap();
    assert_eq!(reply, "Order created with ID: 42");
}

#[tokio::test]
async fn test_redelivered_webhook_does_not_duplicate_order() {
    let buyer = Uuid::new_v4();
    let cart: Cart = [(1, 1)].into_iter().collect();
    let payload = completed_event("cs_test_3", buyer, &cart);

    let mut uow = TestUnitOfWork::default();
    uow.orders
        .expect_find_by_transaction()
        .returning(move |_| Ok(Some(order(17, Some(buyer), "cs_test_3"))));
    uow.orders.expect_record_checkout().never();

    let service = manager(uow, MockPaymentGateway::new(), MockCatalogCache::new());
    let signature = sign(&payload);

    let reply = service.handle_webhook(&payload, Some(signature)).await.unwrap();
    assert_eq!(reply, "Order created with ID: 17");
}

#[tokio::test]
async fn test_other_events_are_acknowledged() {
    let payload = br#"{"type":"customer.created","data":{"object":{"id":"cus_1"}}}"#;
    let service = manager(
        TestUnitOfWork::default(),
        MockPaymentGateway::new(),
        MockCatalogCache::new(),
    );

    let reply = service
        .handle_webhook(payload, Some(sign(payload)))
        .await
        .unwrap();
    assert_eq!(reply, "Unhandled event type: customer.created");
}

// =============================================================================
// Success page
// =============================================================================

#[tokio::test]
async fn test_verify_success_checks_session_status() {
    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_retrieve_checkout_session()
        .returning(|id| {
            Ok(CheckoutSession {
                id: id.to_string(),
                url: None,
                status: Some(if id == "cs_paid" { "complete" } else { "open" }.to_string()),
                metadata: Default::default(),
            })
        });

    let service = manager(TestUnitOfWork::default(), gateway, MockCatalogCache::new());

    assert_eq!(service.verify_success("cs_paid").await.unwrap(), "Payment verified");

    let err = service.verify_success("cs_open").await.unwrap_err();
    assert_eq!(err.to_string(), "Payment incomplete");

    let err = service.verify_success("").await.unwrap_err();
    assert_eq!(err.to_string(), "Missing session ID");
}

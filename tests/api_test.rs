//! Integration tests for API endpoints.
//!
//! The router runs over stub services handed out by a mocked container,
//! so no database, Redis or Stripe connection is needed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use merch_api::api::{create_router, AppState};
use merch_api::config::Config;
use merch_api::domain::{
    AccountResponse, Admin, Cart, CatalogProduct, ColorVariant, CosmeticData, EquippedCosmetics,
    HashedPassword, NewProduct, Order, OrderStatus, PlayerRole, Product, ProductChanges, RoleAction,
    SizeVariant, Stock, StockUpdate, WardrobeItem,
};
use merch_api::errors::{AppError, AppResult};
use merch_api::services::{
    AdminLogin, AdminService, AuthService, CheckoutContact, CheckoutResponse, CosmeticService,
    LoginLink, MockServiceContainer, OrderService, PaymentService, PlayerClaims, PlayerService,
    ProductService, StockService,
};

const VALID_TOKEN: &str = "valid-session-token";
const ADMIN_TOKEN: &str = "valid-admin-token";

fn player_uuid() -> Uuid {
    Uuid::from_u128(0x5e55_1011)
}

fn unused<T>() -> AppResult<T> {
    Err(AppError::internal("not exercised by these tests"))
}

// =============================================================================
// Stub Services
// =============================================================================

struct StubAuth;

#[async_trait]
impl AuthService for StubAuth {
    async fn generate_link(&self, secret: &str, username: String, _uuid: Uuid) -> AppResult<LoginLink> {
        if secret != "server-secret" {
            return Err(AppError::Forbidden);
        }
        Ok(LoginLink {
            link: format!("https://shop.test/login?t={}", username),
        })
    }

    async fn redeem_link(&self, _link_token: &str) -> AppResult<AccountResponse> {
        unused()
    }

    fn verify_token(&self, token: &str) -> AppResult<PlayerClaims> {
        if token == VALID_TOKEN {
            let now = Utc::now().timestamp();
            Ok(PlayerClaims {
                uuid: player_uuid(),
                exp: now + 3600,
                iat: now,
            })
        } else {
            Err(AppError::Unauthorized)
        }
    }
}

struct StubAdmins;

#[async_trait]
impl AdminService for StubAdmins {
    async fn register(&self, _username: String, _password: String) -> AppResult<Admin> {
        unused()
    }

    async fn create(&self, _username: String, _password: String) -> AppResult<Admin> {
        unused()
    }

    async fn login(&self, _username: String, _password: String) -> AppResult<AdminLogin> {
        unused()
    }

    async fn authenticate(&self, token: &str) -> AppResult<Admin> {
        if token != ADMIN_TOKEN {
            return Err(AppError::Unauthorized);
        }
        Ok(Admin {
            id: 1,
            username: "shopkeeper".to_string(),
            password: HashedPassword::unmatchable(),
        })
    }
}

/// No stock rows exist
struct StubStocks;

#[async_trait]
impl StockService for StubStocks {
    async fn by_name(&self, _name: &str) -> AppResult<i64> {
        Ok(0)
    }

    async fn list(&self) -> AppResult<Vec<Stock>> {
        Ok(vec![])
    }

    async fn for_product(&self, product_id: i64) -> AppResult<Stock> {
        Ok(Stock {
            id: 0,
            product_id,
            quantity: 0,
            discount: 0.0,
        })
    }

    async fn update(&self, _id: i64, _update: StockUpdate) -> AppResult<Stock> {
        Err(AppError::not_found("Stock"))
    }
}

struct StubPlayers;

#[async_trait]
impl PlayerService for StubPlayers {
    async fn account(&self, uuid: Uuid) -> AppResult<AccountResponse> {
        Ok(AccountResponse {
            uuid,
            username: "Steve".to_string(),
            creation: Utc::now(),
            last_seen: Utc::now(),
            roles: vec![PlayerRole::Default],
            stats: serde_json::json!({}),
            token: None,
        })
    }

    async fn roles(&self, _uuid: Uuid) -> AppResult<Vec<PlayerRole>> {
        Ok(vec![PlayerRole::Default, PlayerRole::Kryeitor])
    }

    async fn update_roles(
        &self,
        _uuid: Uuid,
        _action: RoleAction,
        _roles: Vec<PlayerRole>,
    ) -> AppResult<Vec<PlayerRole>> {
        unused()
    }
}

struct StubProducts;

#[async_trait]
impl ProductService for StubProducts {
    async fn create(&self, _product: NewProduct) -> AppResult<Product> {
        unused()
    }

    async fn update(&self, _id: i64, _changes: ProductChanges) -> AppResult<Product> {
        unused()
    }

    async fn delete(&self, _id: i64) -> AppResult<()> {
        unused()
    }

    async fn list(&self) -> AppResult<Vec<Product>> {
        Ok(vec![])
    }

    async fn get(&self, id: i64) -> AppResult<Product> {
        Err(AppError::not_found(format!("Product {}", id)))
    }

    async fn catalog(&self) -> AppResult<Vec<CatalogProduct>> {
        Ok(vec![CatalogProduct {
            name: "Hoodie".to_string(),
            description: Some("Warm".to_string()),
            price: 3500,
            is_virtual: false,
            material: Some("Cotton".to_string()),
            color_variants: vec![ColorVariant {
                color: Some("Black".to_string()),
                color_code: Some("000000".to_string()),
                stock: 3,
                sizes: vec![SizeVariant {
                    id: 1,
                    size: Some("M".to_string()),
                    stock: 3,
                    discount: None,
                }],
                images: vec!["/api/products/images/Hoodie/1.webp".to_string()],
            }],
        }])
    }

    async fn details(&self, _name: &str) -> AppResult<CatalogProduct> {
        unused()
    }
}

struct StubOrders;

#[async_trait]
impl OrderService for StubOrders {
    async fn by_player(&self, uuid: Uuid) -> AppResult<Vec<Order>> {
        Ok(vec![Order {
            id: 7,
            uuid: Some(uuid),
            cart: vec![1, 1],
            destination: "Main St 1".to_string(),
            phone: "600000000".to_string(),
            email: "steve@example.com".to_string(),
            status: OrderStatus::Pending,
            transaction: Some("pi_123".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }])
    }

    async fn get(&self, _id: i64) -> AppResult<Order> {
        unused()
    }

    async fn list(&self) -> AppResult<Vec<Order>> {
        unused()
    }

    async fn delete(&self, _id: i64) -> AppResult<()> {
        unused()
    }

    async fn update_status(&self, _id: i64, _status: OrderStatus) -> AppResult<Order> {
        Err(AppError::not_found("Order"))
    }
}

/// Accepts only the signature "t=1,v1=good"
struct StubPayments;

#[async_trait]
impl PaymentService for StubPayments {
    async fn create_checkout(
        &self,
        _cart: Cart,
        _contact: CheckoutContact,
        _player: Option<Uuid>,
    ) -> AppResult<CheckoutResponse> {
        unused()
    }

    async fn handle_webhook(&self, payload: &[u8], signature: Option<String>) -> AppResult<String> {
        match signature.as_deref() {
            Some("t=1,v1=good") if !payload.is_empty() => Ok("Received".to_string()),
            Some(_) => Err(AppError::bad_request("Invalid signature")),
            None => Err(AppError::bad_request("Missing signature")),
        }
    }

    async fn verify_success(&self, _session_id: &str) -> AppResult<String> {
        unused()
    }
}

struct StubCosmetics;

#[async_trait]
impl CosmeticService for StubCosmetics {
    async fn get(&self, _id: i64) -> AppResult<CosmeticData> {
        unused()
    }

    async fn equip(&self, _player: Uuid, _cosmetic_id: i64) -> AppResult<EquippedCosmetics> {
        unused()
    }

    async fn unequip(&self, _player: Uuid, _cosmetic_id: i64) -> AppResult<EquippedCosmetics> {
        unused()
    }

    async fn wardrobe(&self, _player: Uuid) -> AppResult<Vec<WardrobeItem>> {
        Ok(vec![WardrobeItem {
            id: 4,
            name: "Top Hat".to_string(),
            kind: "hat".to_string(),
            equipped: true,
            preview_image: None,
        }])
    }

    async fn equipped(&self, _players: Vec<Uuid>) -> AppResult<HashMap<Uuid, Vec<i64>>> {
        unused()
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

fn stub_container() -> MockServiceContainer {
    let mut services = MockServiceContainer::new();
    services
        .expect_auth()
        .returning(|| Arc::new(StubAuth) as Arc<dyn AuthService>);
    services
        .expect_admins()
        .returning(|| Arc::new(StubAdmins) as Arc<dyn AdminService>);
    services
        .expect_stocks()
        .returning(|| Arc::new(StubStocks) as Arc<dyn StockService>);
    services
        .expect_players()
        .returning(|| Arc::new(StubPlayers) as Arc<dyn PlayerService>);
    services
        .expect_products()
        .returning(|| Arc::new(StubProducts) as Arc<dyn ProductService>);
    services
        .expect_orders()
        .returning(|| Arc::new(StubOrders) as Arc<dyn OrderService>);
    services
        .expect_payments()
        .returning(|| Arc::new(StubPayments) as Arc<dyn PaymentService>);
    services
        .expect_cosmetics()
        .returning(|| Arc::new(StubCosmetics) as Arc<dyn CosmeticService>);
    services
}

fn app() -> Router {
    create_router(AppState::new(Arc::new(stub_container()), Config::for_tests()))
}

async fn send(request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    (status, headers, body.to_vec())
}

async fn get(uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = send(Request::get(uri).body(Body::empty()).unwrap()).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

async fn get_with_token(uri: &str, token: &str) -> (StatusCode, Value) {
    let request = Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(request).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

// =============================================================================
// Root and Health
// =============================================================================

#[tokio::test]
async fn test_root_reports_name_and_version() {
    let (status, body) = get("/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "merch-api");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_health_is_degraded_without_infrastructure() {
    let (status, body) = get("/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"]["status"], "unavailable");
    assert_eq!(body["cache"]["status"], "unavailable");
}

// =============================================================================
// Catalog and Stock
// =============================================================================

#[tokio::test]
async fn test_catalog_uses_storefront_field_names() {
    let (status, body) = get("/api/products/catalog").await;

    assert_eq!(status, StatusCode::OK);
    let hoodie = &body[0];
    assert_eq!(hoodie["name"], "Hoodie");
    assert_eq!(hoodie["virtual"], false);
    assert_eq!(hoodie["colorVariants"][0]["colorCode"], "000000");
    assert_eq!(hoodie["colorVariants"][0]["sizes"][0]["size"], "M");
    assert!(hoodie["colorVariants"][0]["sizes"][0].get("discount").is_none());
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let (status, body) = get("/api/products/999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Product 999 not found");
}

#[tokio::test]
async fn test_stock_rejects_non_numeric_id() {
    let (status, body) = get("/api/stock/abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid product ID");
}

#[tokio::test]
async fn test_stock_by_name_requires_name() {
    let (status, _) = get("/api/stock/by-name").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stock_without_row_is_zero_placeholder() {
    let (status, body) = get("/api/stock/42").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!({"id": 0, "productId": 42, "quantity": 0, "discount": 0.0})
    );
}

async fn admin_patch(uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::PATCH)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", ADMIN_TOKEN))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, _, body) = send(request).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_stock_update_validation_and_missing_row() {
    let (status, _) = admin_patch("/api/stock?id=1", serde_json::json!({"quantity": -1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = admin_patch(
        "/api/stock?id=1",
        serde_json::json!({"quantity": 1, "discount": 150.0}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = admin_patch(
        "/api/stock?id=99",
        serde_json::json!({"quantity": 1, "discount": 5.0}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Stock not found");
}

#[tokio::test]
async fn test_order_status_update() {
    let (status, body) = admin_patch("/api/orders?id=1", serde_json::json!({"status": "LOST"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Unknown order status: LOST");

    let (status, _) = admin_patch("/api/orders?id=404", serde_json::json!({"status": "SHIPPED"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_status_update_requires_admin() {
    let request = Request::builder()
        .method(Method::PATCH)
        .uri("/api/orders?id=1")
        .header(header::AUTHORIZATION, format!("Bearer {}", VALID_TOKEN))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"status":"SHIPPED"}"#))
        .unwrap();

    let (status, _, _) = send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_product_creation_requires_admin() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/products")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"Hoodie","price":3500}"#))
        .unwrap();

    let (status, _, _) = send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Player Sessions
// =============================================================================

#[tokio::test]
async fn test_game_server_can_request_many_links() {
    for i in 0..15 {
        let body = serde_json::json!({
            "authApiSecret": "server-secret",
            "username": format!("player{}", i),
            "uuid": Uuid::new_v4(),
        });
        let request = Request::post("/api/login/link")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let (status, headers, body) = send(request).await;
        let body: Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert!(headers.get("X-RateLimit-Limit").is_none());
        assert_eq!(body["link"], format!("https://shop.test/login?t=player{}", i));
    }
}

#[tokio::test]
async fn test_validate_login_without_link_token_is_unauthorized() {
    let (status, body) = get("/api/login/validate-login").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Authentication required");
}

#[tokio::test]
async fn test_session_validation_requires_token() {
    let (status, _) = get("/api/login/validate").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get_with_token("/api/login/validate", "forged").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_validation_returns_account() {
    let (status, body) = get_with_token("/api/login/validate", VALID_TOKEN).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["uuid"], player_uuid().to_string());
    assert_eq!(body["username"], "Steve");
    assert!(body.get("last-seen").is_some());
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let request = Request::get("/api/account/roles")
        .header(header::COOKIE, format!("auth={}", VALID_TOKEN))
        .body(Body::empty())
        .unwrap();

    let (status, _, body) = send(request).await;
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roles"], serde_json::json!(["DEFAULT", "KRYEITOR"]));
}

async fn logout(cookie: Option<&str>) -> (StatusCode, String, Vec<u8>) {
    let mut request = Request::builder()
        .method(Method::POST)
        .uri("/api/account/logout");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }

    let (status, headers, body) = send(request.body(Body::empty()).unwrap()).await;
    let set_cookie = headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    (status, set_cookie, body)
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let (status, cookie, body) = logout(Some(&format!("auth={}", VALID_TOKEN))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Logged out");
    assert!(cookie.starts_with("auth=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_logout_without_cookie_still_expires_it() {
    let (status, cookie, _) = logout(None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(cookie.starts_with("auth=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_orders_by_player_uses_session() {
    let (status, body) = get_with_token("/api/orders/by-user", VALID_TOKEN).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], 7);
    assert_eq!(body[0]["uuid"], player_uuid().to_string());
}

// =============================================================================
// Payment Webhook
// =============================================================================

async fn post_webhook(signature: Option<&str>) -> (StatusCode, Vec<u8>) {
    let mut request = Request::builder()
        .method(Method::POST)
        .uri("/api/payment/webhook");
    if let Some(signature) = signature {
        request = request.header("Stripe-Signature", signature);
    }

    let (status, _, body) = send(request.body(Body::from(r#"{"type":"ping"}"#)).unwrap()).await;
    (status, body)
}

#[tokio::test]
async fn test_webhook_forwards_signature_header() {
    let (status, body) = post_webhook(Some("t=1,v1=good")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Received");

    let (status, _) = post_webhook(Some("t=1,v1=bad")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_webhook(None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Cosmetics API
// =============================================================================

#[tokio::test]
async fn test_cosmetics_require_api_secret() {
    let (status, _) = get("/api/cosmetics/player/00000000-0000-0000-0000-000000000001/wardrobe").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get_with_token(
        "/api/cosmetics/player/00000000-0000-0000-0000-000000000001/wardrobe",
        "wrong-secret",
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wardrobe_with_api_secret() {
    let (status, body) = get_with_token(
        "/api/cosmetics/player/00000000-0000-0000-0000-000000000001/wardrobe",
        "test-cosmetic-secret",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Top Hat");
    assert_eq!(body[0]["type"], "hat");
    assert_eq!(body[0]["equipped"], true);
}

// =============================================================================
// Documentation
// =============================================================================

#[tokio::test]
async fn test_openapi_document_served() {
    let (status, body) = get("/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/api/products/catalog").is_some());
}

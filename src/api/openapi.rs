//! OpenAPI documentation configuration.
//!
//! Served through Swagger UI at `/swagger-ui`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    account_handler, admin_handler, asset_handler, cosmetic_handler, image_handler, login_handler,
    modpack_handler, order_handler, payment_handler, product_handler, stock_handler,
};
use crate::config::AUTH_COOKIE_NAME;
use crate::domain::{
    AccountResponse, AdminResponse, CatalogProduct, ColorVariant, CosmeticData, EquippedCosmetics,
    Order, OrderStatus, PlayerRole, Product, RoleAction, SizeVariant, Stock, WardrobeItem,
};
use crate::services::{AdminLogin, CheckoutResponse, LoginLink};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Merch API",
        version = "0.1.0",
        description = "Storefront backend: catalog, checkout, player accounts and cosmetics",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:6969", description = "Local development server")
    ),
    paths(
        login_handler::generate_link,
        login_handler::validate_login,
        login_handler::validate,
        account_handler::account,
        account_handler::logout,
        account_handler::roles,
        admin_handler::register,
        admin_handler::login,
        admin_handler::validate,
        admin_handler::update_roles,
        product_handler::create_product,
        product_handler::update_product,
        product_handler::delete_product,
        product_handler::list_products,
        product_handler::get_product,
        product_handler::catalog,
        product_handler::details,
        product_handler::serve_image,
        stock_handler::stock_by_name,
        stock_handler::list_stocks,
        stock_handler::stock_for_product,
        stock_handler::update_stock,
        order_handler::orders_by_player,
        order_handler::list_orders,
        order_handler::get_order,
        order_handler::delete_order,
        order_handler::update_order,
        payment_handler::create_checkout,
        payment_handler::webhook,
        payment_handler::verify_success,
        image_handler::list_images,
        image_handler::upload_image,
        image_handler::delete_image,
        image_handler::swap_images,
        cosmetic_handler::cosmetic_data,
        cosmetic_handler::equip,
        cosmetic_handler::unequip,
        cosmetic_handler::wardrobe,
        cosmetic_handler::equipped,
        asset_handler::cursor,
        modpack_handler::download_modpack,
    ),
    components(
        schemas(
            // Domain types
            AccountResponse,
            AdminResponse,
            PlayerRole,
            RoleAction,
            Product,
            Stock,
            Order,
            OrderStatus,
            CatalogProduct,
            ColorVariant,
            SizeVariant,
            CosmeticData,
            WardrobeItem,
            EquippedCosmetics,
            // Service types
            LoginLink,
            AdminLogin,
            CheckoutResponse,
            // Request and response bodies
            login_handler::LinkRequest,
            account_handler::RolesResponse,
            admin_handler::AdminCredentials,
            admin_handler::UpdateRolesRequest,
            admin_handler::PlayerRolesResponse,
            product_handler::CreateProductRequest,
            product_handler::UpdateProductRequest,
            stock_handler::UpdateStockRequest,
            order_handler::UpdateOrderRequest,
            payment_handler::CreateCheckoutRequest,
            image_handler::UploadedImage,
            cosmetic_handler::EquipRequest,
            cosmetic_handler::EquippedRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Login", description = "Player login links and sessions"),
        (name = "Account", description = "Signed-in player account"),
        (name = "Admin", description = "Admin panel accounts"),
        (name = "Products", description = "Products and storefront catalog"),
        (name = "Stock", description = "Stock levels"),
        (name = "Orders", description = "Placed orders"),
        (name = "Payment", description = "Stripe checkout"),
        (name = "Images", description = "Product image management"),
        (name = "Cosmetics", description = "Game server cosmetics API"),
        (name = "Assets", description = "Downloads")
    )
)]
pub struct ApiDoc;

/// Session cookie and bearer token schemes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Session token, or the cosmetics API secret on /api/cosmetics",
                        ))
                        .build(),
                ),
            );
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(AUTH_COOKIE_NAME))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_storefront_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for path in [
            "/api/login/link",
            "/api/products/catalog",
            "/api/payment/webhook",
            "/api/cosmetics/player/{player}/equip",
            "/api/modpack",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_security_schemes_registered() {
        let doc = ApiDoc::openapi();
        let schemes = &doc.components.unwrap().security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
        assert!(schemes.contains_key("cookie_auth"));
    }
}

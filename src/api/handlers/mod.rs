//! HTTP request handlers.

pub mod account_handler;
pub mod admin_handler;
pub mod asset_handler;
pub mod cosmetic_handler;
pub mod image_handler;
pub mod login_handler;
pub mod modpack_handler;
pub mod order_handler;
pub mod payment_handler;
pub mod product_handler;
pub mod stock_handler;

pub use account_handler::{account_routes, public_account_routes};
pub use admin_handler::{admin_auth_routes, admin_routes};
pub use asset_handler::asset_routes;
pub use cosmetic_handler::cosmetic_routes;
pub use image_handler::image_routes;
pub use login_handler::{login_link_routes, login_routes, login_session_routes};
pub use modpack_handler::modpack_routes;
pub use order_handler::order_routes;
pub use payment_handler::payment_routes;
pub use product_handler::product_routes;
pub use stock_handler::stock_routes;

use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::config::{AUTH_COOKIE_NAME, SECONDS_PER_DAY, TOKEN_EXPIRATION_DAYS};
use crate::errors::{AppError, AppResult};

/// `?id=` selector used by the admin update and delete endpoints
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IdQuery {
    /// Target row id
    pub id: i64,
}

/// Session cookie carrying a player or admin token.
pub(crate) fn session_cookie(token: String, secure: bool) -> AppResult<Cookie<'static>> {
    let mut cookie = Cookie::parse(format!(
        "{}={}; Max-Age={}",
        AUTH_COOKIE_NAME,
        token,
        TOKEN_EXPIRATION_DAYS * SECONDS_PER_DAY
    ))
    .map_err(|e| AppError::internal(format!("Session cookie rejected: {}", e)))?;

    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    Ok(cookie)
}

/// Empty, already expired session cookie.
pub(crate) fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::from(AUTH_COOKIE_NAME);
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

/// Trimmed value, or `None` when blank.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

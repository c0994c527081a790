//! Signed-in player account handlers.

use axum::{
    extract::{Extension, State},
    response::Json,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use utoipa::ToSchema;

use super::expired_session_cookie;
use crate::api::middleware::CurrentPlayer;
use crate::api::AppState;
use crate::domain::{AccountResponse, PlayerRole};
use crate::errors::AppResult;

#[derive(Debug, Serialize, ToSchema)]
pub struct RolesResponse {
    pub roles: Vec<PlayerRole>,
}

/// Routes that need a player session
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account))
        .route("/roles", get(roles))
}

/// Routes that work without a session
pub fn public_account_routes() -> Router<AppState> {
    Router::new().route("/logout", post(logout))
}

/// Current player's account
#[utoipa::path(
    get,
    path = "/api/account",
    tag = "Account",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account details", body = AccountResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn account(
    Extension(player): Extension<CurrentPlayer>,
    State(state): State<AppState>,
) -> AppResult<Json<AccountResponse>> {
    Ok(Json(state.services.players().account(player.uuid).await?))
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/api/account/logout",
    tag = "Account",
    responses((status = 200, description = "Session cookie cleared"))
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, &'static str) {
    (jar.add(expired_session_cookie()), "Logged out")
}

/// Current player's roles
#[utoipa::path(
    get,
    path = "/api/account/roles",
    tag = "Account",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "Player roles", body = RolesResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn roles(
    Extension(player): Extension<CurrentPlayer>,
    State(state): State<AppState>,
) -> AppResult<Json<RolesResponse>> {
    let roles = state.services.players().roles(player.uuid).await?;
    Ok(Json(RolesResponse { roles }))
}

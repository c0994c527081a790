//! Player login handlers.
//!
//! The game server asks for a login link on a player's behalf; the
//! storefront redeems it for a session cookie.

use axum::{
    extract::{Extension, State},
    response::Json,
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::session_cookie;
use crate::api::extractors::{QueryParams, ValidatedJson};
use crate::api::middleware::CurrentPlayer;
use crate::api::AppState;
use crate::domain::AccountResponse;
use crate::errors::{AppError, AppResult};
use crate::services::LoginLink;

/// Login link request sent by the game server
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkRequest {
    /// Shared secret of the game server
    pub auth_api_secret: String,
    #[validate(length(min = 1, max = 16, message = "Username must be 1 to 16 characters"))]
    #[schema(example = "Steve")]
    pub username: String,
    pub uuid: Uuid,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LinkTokenQuery {
    /// Token from the login link
    pub t: Option<String>,
}

/// Link issuing for the game server, guarded by its shared secret
pub fn login_link_routes() -> Router<AppState> {
    Router::new().route("/link", get(generate_link).post(generate_link))
}

/// Link redemption (rate limited)
pub fn login_routes() -> Router<AppState> {
    Router::new().route("/validate-login", get(validate_login))
}

/// Routes that need a player session
pub fn login_session_routes() -> Router<AppState> {
    Router::new().route("/validate", get(validate))
}

/// Create a login link for a player
#[utoipa::path(
    post,
    path = "/api/login/link",
    tag = "Login",
    request_body = LinkRequest,
    responses(
        (status = 200, description = "Login link created", body = LoginLink),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Wrong game server secret")
    )
)]
pub async fn generate_link(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LinkRequest>,
) -> AppResult<Json<LoginLink>> {
    let link = state
        .services
        .auth()
        .generate_link(&payload.auth_api_secret, payload.username, payload.uuid)
        .await?;

    Ok(Json(link))
}

/// Redeem a login link for a session
#[utoipa::path(
    get,
    path = "/api/login/validate-login",
    tag = "Login",
    params(LinkTokenQuery),
    responses(
        (status = 200, description = "Signed in; session cookie set", body = AccountResponse),
        (status = 401, description = "Missing, invalid or expired link")
    )
)]
pub async fn validate_login(
    State(state): State<AppState>,
    jar: CookieJar,
    QueryParams(query): QueryParams<LinkTokenQuery>,
) -> AppResult<(CookieJar, Json<AccountResponse>)> {
    let link_token = query
        .t
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)?;

    let account = state.services.auth().redeem_link(&link_token).await?;
    let token = account.token.clone().ok_or_else(|| {
        AppError::internal("Redeemed login link produced no session token")
    })?;

    let jar = jar.add(session_cookie(token, state.config.cookie_secure)?);
    Ok((jar, Json(account)))
}

/// Check the current session
#[utoipa::path(
    get,
    path = "/api/login/validate",
    tag = "Login",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session is valid", body = AccountResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn validate(
    Extension(player): Extension<CurrentPlayer>,
    State(state): State<AppState>,
) -> AppResult<Json<AccountResponse>> {
    let account = state.services.players().account(player.uuid).await?;
    Ok(Json(account))
}

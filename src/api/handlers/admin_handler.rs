//! Admin panel account handlers.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::session_cookie;
use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentAdmin;
use crate::api::AppState;
use crate::domain::{AdminResponse, PlayerRole, RoleAction};
use crate::errors::AppResult;
use crate::services::AdminLogin;

/// Admin username and password
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdminCredentials {
    #[validate(length(min = 1, message = "Username is required"))]
    #[schema(example = "shopkeeper")]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "correct horse battery")]
    pub password: String,
}

/// Role change for a player
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRolesRequest {
    pub action: RoleAction,
    #[validate(length(min = 1, message = "At least one role is required"))]
    pub roles: Vec<PlayerRole>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerRolesResponse {
    pub uuid: Uuid,
    pub roles: Vec<PlayerRole>,
}

/// Sign-up and sign-in (rate limited, no session)
pub fn admin_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Routes that need an admin session
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/validate", get(validate))
        .route("/players/:uuid/roles", patch(update_roles))
}

/// Create the first admin account
#[utoipa::path(
    post,
    path = "/api/admin/register",
    tag = "Admin",
    request_body = AdminCredentials,
    responses(
        (status = 201, description = "Admin created", body = AdminResponse),
        (status = 400, description = "An admin already exists or validation failed")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AdminCredentials>,
) -> AppResult<(StatusCode, Json<AdminResponse>)> {
    let admin = state
        .services
        .admins()
        .register(payload.username, payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(AdminResponse::from(admin))))
}

/// Sign in to the admin panel
#[utoipa::path(
    post,
    path = "/api/admin/login",
    tag = "Admin",
    request_body = AdminCredentials,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = AdminLogin),
        (status = 401, description = "Invalid username or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<AdminCredentials>,
) -> AppResult<(CookieJar, Json<AdminLogin>)> {
    let login = state
        .services
        .admins()
        .login(payload.username, payload.password)
        .await?;

    let jar = jar.add(session_cookie(login.token.clone(), state.config.cookie_secure)?);
    Ok((jar, Json(login)))
}

/// Current admin
#[utoipa::path(
    get,
    path = "/api/admin/validate",
    tag = "Admin",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "Admin session is valid", body = AdminResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn validate(Extension(admin): Extension<CurrentAdmin>) -> Json<AdminResponse> {
    Json(AdminResponse {
        id: admin.id,
        username: admin.username,
    })
}

/// Add or remove player roles
#[utoipa::path(
    patch,
    path = "/api/admin/players/{uuid}/roles",
    tag = "Admin",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(("uuid" = Uuid, Path, description = "Player UUID")),
    request_body = UpdateRolesRequest,
    responses(
        (status = 200, description = "Roles after the change", body = PlayerRolesResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Player not found")
    )
)]
pub async fn update_roles(
    Extension(admin): Extension<CurrentAdmin>,
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateRolesRequest>,
) -> AppResult<Json<PlayerRolesResponse>> {
    let roles = state
        .services
        .players()
        .update_roles(uuid, payload.action, payload.roles)
        .await?;

    tracing::info!(admin = %admin.username, player = %uuid, "Player roles updated");
    Ok(Json(PlayerRolesResponse { uuid, roles }))
}

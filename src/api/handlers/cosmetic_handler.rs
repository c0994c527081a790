//! Cosmetics API used by the game server.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{CosmeticData, EquippedCosmetics, WardrobeItem};
use crate::errors::AppResult;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquipRequest {
    #[schema(example = 4)]
    pub cosmetic_id: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EquippedRequest {
    #[validate(length(max = 500, message = "At most 500 players per request"))]
    pub players: Vec<Uuid>,
}

/// Create cosmetic routes. Every route needs the cosmetics API secret.
pub fn cosmetic_routes() -> Router<AppState> {
    Router::new()
        .route("/cosmetic/:id", get(cosmetic_data))
        .route("/player/:player/equip", post(equip))
        .route("/player/:player/unequip", post(unequip))
        .route("/player/:player/wardrobe", get(wardrobe))
        .route("/equipped", get(equipped).post(equipped))
}

/// Rendering data of a cosmetic
#[utoipa::path(
    get,
    path = "/api/cosmetics/cosmetic/{id}",
    tag = "Cosmetics",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Cosmetic ID")),
    responses(
        (status = 200, description = "Model, script and type", body = CosmeticData),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Cosmetic not found")
    )
)]
pub async fn cosmetic_data(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CosmeticData>> {
    Ok(Json(state.services.cosmetics().get(id).await?))
}

/// Equip a cosmetic, replacing the one in the same slot
#[utoipa::path(
    post,
    path = "/api/cosmetics/player/{player}/equip",
    tag = "Cosmetics",
    security(("bearer_auth" = [])),
    params(("player" = Uuid, Path, description = "Player UUID")),
    request_body = EquipRequest,
    responses(
        (status = 200, description = "Cosmetics now equipped", body = EquippedCosmetics),
        (status = 400, description = "Unknown cosmetic or not owned"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn equip(
    State(state): State<AppState>,
    Path(player): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<EquipRequest>,
) -> AppResult<Json<EquippedCosmetics>> {
    let equipped = state
        .services
        .cosmetics()
        .equip(player, payload.cosmetic_id)
        .await?;
    Ok(Json(equipped))
}

/// Take off a cosmetic
#[utoipa::path(
    post,
    path = "/api/cosmetics/player/{player}/unequip",
    tag = "Cosmetics",
    security(("bearer_auth" = [])),
    params(("player" = Uuid, Path, description = "Player UUID")),
    request_body = EquipRequest,
    responses(
        (status = 200, description = "Cosmetics still equipped", body = EquippedCosmetics),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn unequip(
    State(state): State<AppState>,
    Path(player): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<EquipRequest>,
) -> AppResult<Json<EquippedCosmetics>> {
    let equipped = state
        .services
        .cosmetics()
        .unequip(player, payload.cosmetic_id)
        .await?;
    Ok(Json(equipped))
}

/// Cosmetics a player owns
#[utoipa::path(
    get,
    path = "/api/cosmetics/player/{player}/wardrobe",
    tag = "Cosmetics",
    security(("bearer_auth" = [])),
    params(("player" = Uuid, Path, description = "Player UUID")),
    responses(
        (status = 200, description = "Wardrobe", body = Vec<WardrobeItem>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn wardrobe(
    State(state): State<AppState>,
    Path(player): Path<Uuid>,
) -> AppResult<Json<Vec<WardrobeItem>>> {
    Ok(Json(state.services.cosmetics().wardrobe(player).await?))
}

/// Equipped cosmetics of several players
#[utoipa::path(
    post,
    path = "/api/cosmetics/equipped",
    tag = "Cosmetics",
    security(("bearer_auth" = [])),
    request_body = EquippedRequest,
    responses(
        (status = 200, description = "Player UUID to equipped cosmetic ids", body = HashMap<String, Vec<i64>>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn equipped(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<EquippedRequest>,
) -> AppResult<Json<HashMap<Uuid, Vec<i64>>>> {
    Ok(Json(state.services.cosmetics().equipped(payload.players).await?))
}

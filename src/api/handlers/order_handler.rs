//! Order handlers.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::IdQuery;
use crate::api::extractors::{QueryParams, ValidatedJson};
use crate::api::middleware::{admin_auth_middleware, player_auth_middleware, CurrentPlayer};
use crate::api::AppState;
use crate::domain::{Order, OrderStatus};
use crate::errors::AppResult;

/// New order status
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    #[schema(example = "SHIPPED")]
    pub status: String,
}

/// Create order routes. Players see their own orders; everything else is admin only.
pub fn order_routes(state: &AppState) -> Router<AppState> {
    let player_only = middleware::from_fn_with_state(state.clone(), player_auth_middleware);
    let admin_only = middleware::from_fn_with_state(state.clone(), admin_auth_middleware);

    let player = Router::new()
        .route("/by-user", get(orders_by_player))
        .route_layer(player_only);

    let admin = Router::new()
        .route(
            "/",
            get(list_orders).delete(delete_order).patch(update_order),
        )
        .route("/:id", get(get_order))
        .route_layer(admin_only);

    player.merge(admin)
}

/// Orders of the signed-in player
#[utoipa::path(
    get,
    path = "/api/orders/by-user",
    tag = "Orders",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "Player's orders", body = Vec<Order>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn orders_by_player(
    Extension(player): Extension<CurrentPlayer>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.services.orders().by_player(player.uuid).await?))
}

/// Every order, newest first
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "All orders", body = Vec<Order>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_orders(State(state): State<AppState>) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.services.orders().list().await?))
}

/// One order
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.services.orders().get(id).await?))
}

/// Delete an order
#[utoipa::path(
    delete,
    path = "/api/orders",
    tag = "Orders",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(IdQuery),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn delete_order(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<IdQuery>,
) -> AppResult<StatusCode> {
    state.services.orders().delete(query.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Move an order to another status
#[utoipa::path(
    patch,
    path = "/api/orders",
    tag = "Orders",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(IdQuery),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Updated order", body = Order),
        (status = 400, description = "Unknown status"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn update_order(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<IdQuery>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderRequest>,
) -> AppResult<Json<Order>> {
    let status: OrderStatus = payload.status.parse()?;
    let order = state
        .services
        .orders()
        .update_status(query.id, status)
        .await?;
    Ok(Json(order))
}

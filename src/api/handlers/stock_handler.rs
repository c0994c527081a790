//! Stock handlers.

use axum::{
    extract::{Path, State},
    middleware,
    response::Json,
    routing::{get, patch},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::IdQuery;
use crate::api::extractors::{QueryParams, ValidatedJson};
use crate::api::middleware::admin_auth_middleware;
use crate::api::AppState;
use crate::domain::{Stock, StockUpdate};
use crate::errors::{AppError, AppResult};

/// New quantity and discount of a stock row
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStockRequest {
    #[serde(default)]
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    #[schema(example = 12)]
    pub quantity: i64,
    /// Percentage
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0, message = "Discount must be between 0 and 100"))]
    #[schema(example = 10.0)]
    pub discount: f64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StockNameQuery {
    pub name: Option<String>,
}

/// Create stock routes. Updates require an admin session.
pub fn stock_routes(state: &AppState) -> Router<AppState> {
    let admin_only = middleware::from_fn_with_state(state.clone(), admin_auth_middleware);

    Router::new()
        .route(
            "/",
            get(list_stocks).merge(patch(update_stock).route_layer(admin_only)),
        )
        .route("/by-name", get(stock_by_name))
        .route("/:id", get(stock_for_product))
}

/// Total stock over every variant with a name
#[utoipa::path(
    get,
    path = "/api/stock/by-name",
    tag = "Stock",
    params(StockNameQuery),
    responses(
        (status = 200, description = "Summed quantity", body = i64),
        (status = 400, description = "Missing name")
    )
)]
pub async fn stock_by_name(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<StockNameQuery>,
) -> AppResult<Json<i64>> {
    let name = query
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Missing product name"))?;

    Ok(Json(state.services.stocks().by_name(&name).await?))
}

/// Every stock row
#[utoipa::path(
    get,
    path = "/api/stock",
    tag = "Stock",
    responses((status = 200, description = "All stock rows", body = Vec<Stock>))
)]
pub async fn list_stocks(State(state): State<AppState>) -> AppResult<Json<Vec<Stock>>> {
    Ok(Json(state.services.stocks().list().await?))
}

/// Stock of one product
#[utoipa::path(
    get,
    path = "/api/stock/{id}",
    tag = "Stock",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Stock row, or an empty one", body = Stock),
        (status = 400, description = "Invalid product ID")
    )
)]
pub async fn stock_for_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Stock>> {
    let product_id: i64 = id
        .parse()
        .map_err(|_| AppError::bad_request("Invalid product ID"))?;

    Ok(Json(state.services.stocks().for_product(product_id).await?))
}

/// Change quantity and discount of a stock row
#[utoipa::path(
    patch,
    path = "/api/stock",
    tag = "Stock",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(IdQuery),
    request_body = UpdateStockRequest,
    responses(
        (status = 200, description = "Updated stock", body = Stock),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Stock not found")
    )
)]
pub async fn update_stock(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<IdQuery>,
    ValidatedJson(payload): ValidatedJson<UpdateStockRequest>,
) -> AppResult<Json<Stock>> {
    let stock = state
        .services
        .stocks()
        .update(
            query.id,
            StockUpdate {
                quantity: payload.quantity,
                discount: payload.discount,
            },
        )
        .await?;
    Ok(Json(stock))
}

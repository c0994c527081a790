//! Product and catalog handlers.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{delete, get},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{non_blank, IdQuery};
use crate::api::extractors::{QueryParams, ValidatedJson};
use crate::api::middleware::admin_auth_middleware;
use crate::api::AppState;
use crate::config::IMAGE_CONTENT_TYPE;
use crate::domain::{CatalogProduct, NewProduct, Product, ProductChanges};
use crate::errors::AppResult;

fn default_listed() -> bool {
    true
}

/// New product variant
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 128, message = "Name must be 1 to 128 characters"))]
    #[schema(example = "Hoodie")]
    pub name: String,
    pub description: Option<String>,
    /// Price in whole euros
    #[validate(range(min = 0, max = 1000000, message = "Price must be between 0 and 1000000"))]
    #[schema(example = 35)]
    pub price: i64,
    #[schema(example = "M")]
    pub size: Option<String>,
    #[schema(example = "#1a1a1a")]
    pub color: Option<String>,
    pub material: Option<String>,
    #[serde(default, rename = "virtual")]
    pub is_virtual: bool,
    #[serde(default = "default_listed")]
    pub listed: bool,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(request: CreateProductRequest) -> Self {
        Self {
            name: request.name.trim().to_string(),
            description: non_blank(request.description),
            price: request.price,
            size: non_blank(request.size),
            color: non_blank(request.color),
            material: non_blank(request.material),
            is_virtual: request.is_virtual,
            listed: request.listed,
        }
    }
}

/// Partial product update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 128, message = "Name must be 1 to 128 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, max = 1000000, message = "Price must be between 0 and 1000000"))]
    pub price: Option<i64>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    #[serde(rename = "virtual")]
    pub is_virtual: Option<bool>,
    pub listed: Option<bool>,
}

impl From<UpdateProductRequest> for ProductChanges {
    fn from(request: UpdateProductRequest) -> Self {
        Self {
            name: request.name.map(|name| name.trim().to_string()),
            description: request.description,
            price: request.price,
            size: request.size,
            color: request.color,
            material: request.material,
            is_virtual: request.is_virtual,
            listed: request.listed,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DetailsQuery {
    /// Product name shared by the variants
    pub name: Option<String>,
}

/// Create product routes. Writes require an admin session.
pub fn product_routes(state: &AppState) -> Router<AppState> {
    let admin_only = middleware::from_fn_with_state(state.clone(), admin_auth_middleware);

    Router::new()
        .route(
            "/",
            get(list_products).merge(
                delete(delete_product)
                    .post(create_product)
                    .patch(update_product)
                    .route_layer(admin_only),
            ),
        )
        .route("/catalog", get(catalog))
        .route("/details", get(details))
        .route("/:id", get(get_product))
        .route("/images/:name/:file", get(serve_image))
}

/// Create a product variant with an empty stock row
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = state.services.products().create(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product variant
#[utoipa::path(
    patch,
    path = "/api/products",
    tag = "Products",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(IdQuery),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<IdQuery>,
    ValidatedJson(payload): ValidatedJson<UpdateProductRequest>,
) -> AppResult<Json<Product>> {
    let product = state
        .services
        .products()
        .update(query.id, payload.into())
        .await?;
    Ok(Json(product))
}

/// Delete a product variant and its stock
#[utoipa::path(
    delete,
    path = "/api/products",
    tag = "Products",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(IdQuery),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<IdQuery>,
) -> AppResult<StatusCode> {
    state.services.products().delete(query.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// All product variants
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    responses((status = 200, description = "Every product variant", body = Vec<Product>))
)]
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(state.services.products().list().await?))
}

/// One product variant
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product variant", body = Product),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Product>> {
    Ok(Json(state.services.products().get(id).await?))
}

/// Listed products grouped for the storefront
#[utoipa::path(
    get,
    path = "/api/products/catalog",
    tag = "Products",
    responses((status = 200, description = "Storefront catalog", body = Vec<CatalogProduct>))
)]
pub async fn catalog(State(state): State<AppState>) -> AppResult<Json<Vec<CatalogProduct>>> {
    Ok(Json(state.services.products().catalog().await?))
}

/// Every variant of one product, with discounts
#[utoipa::path(
    get,
    path = "/api/products/details",
    tag = "Products",
    params(DetailsQuery),
    responses(
        (status = 200, description = "Product details", body = CatalogProduct),
        (status = 400, description = "Missing name"),
        (status = 404, description = "No variants with that name")
    )
)]
pub async fn details(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<DetailsQuery>,
) -> AppResult<Json<CatalogProduct>> {
    let name = query.name.unwrap_or_default();
    Ok(Json(state.services.products().details(&name).await?))
}

/// Serve a stored product image
#[utoipa::path(
    get,
    path = "/api/products/images/{name}/{file}",
    tag = "Products",
    params(
        ("name" = String, Path, description = "Product name"),
        ("file" = String, Path, description = "Image file, e.g. 1.webp")
    ),
    responses(
        (status = 200, description = "WebP image", content_type = "image/webp"),
        (status = 404, description = "Image not found")
    )
)]
pub async fn serve_image(
    State(state): State<AppState>,
    Path((name, file)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let bytes = state.services.images().read(&name, &file).await?;
    Ok(([(header::CONTENT_TYPE, IMAGE_CONTENT_TYPE)], bytes))
}

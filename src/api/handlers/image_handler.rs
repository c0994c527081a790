//! Product image management handlers.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{delete, get},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::extractors::QueryParams;
use crate::api::middleware::admin_auth_middleware;
use crate::api::AppState;
use crate::errors::{AppError, AppResult};

/// Multipart field carrying the uploaded image
const IMAGE_FIELD: &str = "image";

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListImagesQuery {
    /// Return only this image (1-based)
    pub index: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImageIndexQuery {
    pub index: u32,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SwapImagesQuery {
    pub i: u32,
    pub j: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadedImage {
    /// Index the image was stored under
    pub index: u32,
}

/// Create image routes. Changes require an admin session.
pub fn image_routes(state: &AppState) -> Router<AppState> {
    let admin_only = middleware::from_fn_with_state(state.clone(), admin_auth_middleware);

    Router::new().route(
        "/products/:name",
        get(list_images).merge(
            delete(delete_image)
                .post(upload_image)
                .patch(swap_images)
                .route_layer(admin_only),
        ),
    )
}

/// Image URLs of a product, or one of them
#[utoipa::path(
    get,
    path = "/api/images/products/{name}",
    tag = "Images",
    params(("name" = String, Path, description = "Product name"), ListImagesQuery),
    responses(
        (status = 200, description = "Image URLs in display order", body = Vec<String>),
        (status = 400, description = "Invalid product name"),
        (status = 404, description = "Image not found")
    )
)]
pub async fn list_images(
    State(state): State<AppState>,
    Path(name): Path<String>,
    QueryParams(query): QueryParams<ListImagesQuery>,
) -> AppResult<Response> {
    let images = state.services.images();
    match query.index {
        Some(index) => Ok(Json(images.find(&name, index).await?).into_response()),
        None => Ok(Json(images.list(&name).await?).into_response()),
    }
}

/// Append an image to a product
#[utoipa::path(
    post,
    path = "/api/images/products/{name}",
    tag = "Images",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(("name" = String, Path, description = "Product name")),
    request_body(content = String, description = "Multipart form with an `image` field", content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored", body = UploadedImage),
        (status = 400, description = "Missing or empty image"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn upload_image(
    State(state): State<AppState>,
    Path(name): Path<String>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadedImage>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;
        let index = state.services.images().upload(&name, bytes.to_vec()).await?;

        tracing::info!(product = %name, index, "Product image uploaded");
        return Ok((StatusCode::CREATED, Json(UploadedImage { index })));
    }

    Err(AppError::bad_request("No image uploaded"))
}

/// Delete an image and close the gap
#[utoipa::path(
    delete,
    path = "/api/images/products/{name}",
    tag = "Images",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(("name" = String, Path, description = "Product name"), ImageIndexQuery),
    responses(
        (status = 200, description = "Image deleted", body = String),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Image not found")
    )
)]
pub async fn delete_image(
    State(state): State<AppState>,
    Path(name): Path<String>,
    QueryParams(query): QueryParams<ImageIndexQuery>,
) -> AppResult<&'static str> {
    state.services.images().delete(&name, query.index).await?;
    Ok("Image deleted successfully.")
}

/// Swap the positions of two images
#[utoipa::path(
    patch,
    path = "/api/images/products/{name}",
    tag = "Images",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(("name" = String, Path, description = "Product name"), SwapImagesQuery),
    responses(
        (status = 200, description = "Images swapped", body = String),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Image not found")
    )
)]
pub async fn swap_images(
    State(state): State<AppState>,
    Path(name): Path<String>,
    QueryParams(query): QueryParams<SwapImagesQuery>,
) -> AppResult<&'static str> {
    state
        .services
        .images()
        .swap(&name, query.i, query.j)
        .await?;
    Ok("Images swapped successfully.")
}

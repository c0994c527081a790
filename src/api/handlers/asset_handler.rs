//! Downloadable game assets.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::io::ErrorKind;

use crate::api::AppState;
use crate::config::CURSOR_ASSET_FILE;
use crate::errors::{AppError, AppResult};

pub fn asset_routes() -> Router<AppState> {
    Router::new().route("/cursor", get(cursor))
}

/// Cursor resource pack
#[utoipa::path(
    get,
    path = "/api/assets/cursor",
    tag = "Assets",
    responses(
        (status = 200, description = "Cursor pack", content_type = "application/octet-stream"),
        (status = 404, description = "File not found")
    )
)]
pub async fn cursor(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let path = state.config.assets_dir.join(CURSOR_ASSET_FILE);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Cursor asset missing");
            return Err(AppError::not_found("File"));
        }
        Err(e) => return Err(e.into()),
    };

    let disposition = format!("attachment; filename=\"{}\"", CURSOR_ASSET_FILE);
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

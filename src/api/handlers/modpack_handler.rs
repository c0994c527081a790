//! Modpack download.

use axum::{extract::State, http::header, response::IntoResponse, routing::get, Router};

use crate::api::AppState;
use crate::config::MODPACK_ARCHIVE_NAME;
use crate::errors::AppResult;

pub fn modpack_routes() -> Router<AppState> {
    Router::new().route("/", get(download_modpack))
}

/// Mods of the latest server modpack as one zip
#[utoipa::path(
    get,
    path = "/api/modpack",
    tag = "Assets",
    responses(
        (status = 200, description = "Zip of every mod", content_type = "application/zip"),
        (status = 500, description = "Modpack index missing"),
        (status = 502, description = "Modrinth failed")
    )
)]
pub async fn download_modpack(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let archive = state.services.modpack().build_archive().await?;
    let disposition = format!("attachment; filename=\"{}\"", MODPACK_ARCHIVE_NAME);

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        archive,
    ))
}

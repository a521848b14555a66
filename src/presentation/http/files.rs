use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::use_cases::files::get_file_usage::GetFileUsage;
use crate::application::use_cases::pages::resync_dependents::{DependencyTarget, ResyncDependents};
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::pages::{BacklinkItem, ResyncResponse};
use crate::presentation::http::status_for;

#[derive(Debug, Serialize, ToSchema)]
pub struct FileUsageResponse {
    pub file_id: i64,
    pub pages: Vec<BacklinkItem>,
}

#[utoipa::path(get, path = "/api/files/{id}/usage", tag = "Files",
    params(("id" = i64, Path, description = "File ID")),
    responses((status = 200, body = FileUsageResponse)))]
pub async fn get_file_usage(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> Result<Json<FileUsageResponse>, StatusCode> {
    let repo = ctx.tracking_repo();
    let uc = GetFileUsage {
        tracking: repo.as_ref(),
    };
    let pages = uc
        .execute(id)
        .await
        .map_err(status_for)?
        .into_iter()
        .map(|b| BacklinkItem {
            page_id: b.page_id,
            title: b.title,
            field_names: b.field_names,
        })
        .collect();
    Ok(Json(FileUsageResponse { file_id: id, pages }))
}

/// Called after a file is removed or restored so every page embedding it is rescanned.
#[utoipa::path(post, path = "/api/files/{id}/resync", tag = "Files",
    params(("id" = i64, Path, description = "File ID")),
    responses((status = 200, body = ResyncResponse)))]
pub async fn resync_file_dependents(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> Result<Json<ResyncResponse>, StatusCode> {
    let tracker = ctx.link_tracker();
    let uc = ResyncDependents { tracker: &tracker };
    let resynced = uc
        .execute(DependencyTarget::File(id))
        .await
        .map_err(status_for)?;
    Ok(Json(ResyncResponse { resynced }))
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/files/:id/usage", get(get_file_usage))
        .route("/files/:id/resync", post(resync_file_dependents))
        .with_state(ctx)
}

use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::use_cases::pages::delete_page::DeletePage;
use crate::application::use_cases::pages::get_backlinks::GetBacklinks;
use crate::application::use_cases::pages::get_outgoing_links::GetOutgoingLinks;
use crate::application::use_cases::pages::resync_dependents::{DependencyTarget, ResyncDependents};
use crate::application::use_cases::pages::save_page::{PageEdits, SavePage};
use crate::application::use_cases::pages::sync_page::SyncPage;
use crate::bootstrap::app_context::AppContext;
use crate::domain::links::link::TrackingRelation;
use crate::domain::pages::page::{DEFAULT_PAGE_TYPE, Page};
use crate::presentation::http::status_for;

#[derive(Debug, Serialize, ToSchema)]
pub struct PageResponse {
    pub id: Option<i64>,
    pub page_type: String,
    pub title: String,
    pub fields: BTreeMap<String, String>,
    pub has_broken_link: bool,
    pub has_broken_file: bool,
    pub last_edited: chrono::DateTime<chrono::Utc>,
}

impl From<Page> for PageResponse {
    fn from(p: Page) -> Self {
        PageResponse {
            id: p.id,
            page_type: p.page_type,
            title: p.title,
            fields: p.fields,
            has_broken_link: p.has_broken_link,
            has_broken_file: p.has_broken_file,
            last_edited: p.last_edited,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePageRequest {
    pub page_type: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePageRequest {
    pub title: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResyncResponse {
    pub resynced: Vec<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BacklinkItem {
    pub page_id: i64,
    pub title: String,
    pub field_names: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BacklinksResponse {
    pub backlinks: Vec<BacklinkItem>,
    pub total_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OutgoingLinkItem {
    /// `page` for anchors to other pages, `file` for linked or embedded files.
    pub target_kind: String,
    pub target_id: i64,
    pub field_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OutgoingLinksResponse {
    pub links: Vec<OutgoingLinkItem>,
    pub total_count: usize,
}

#[utoipa::path(post, path = "/api/pages", tag = "Pages",
    request_body = CreatePageRequest,
    responses((status = 200, body = PageResponse), (status = 422, description = "Unknown page type or field")))]
pub async fn create_page(
    State(ctx): State<AppContext>,
    Json(req): Json<CreatePageRequest>,
) -> Result<Json<PageResponse>, StatusCode> {
    let tracker = ctx.link_tracker();
    let uc = SavePage { tracker: &tracker };
    let page_type = req.page_type.as_deref().unwrap_or(DEFAULT_PAGE_TYPE);
    let page = uc
        .create(
            page_type,
            PageEdits {
                title: req.title,
                fields: req.fields,
            },
        )
        .await
        .map_err(status_for)?;
    Ok(Json(page.into()))
}

#[utoipa::path(put, path = "/api/pages/{id}", tag = "Pages",
    request_body = UpdatePageRequest,
    params(("id" = i64, Path, description = "Page ID")),
    responses((status = 200, body = PageResponse), (status = 404, description = "Page not found")))]
pub async fn update_page(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePageRequest>,
) -> Result<Json<PageResponse>, StatusCode> {
    let tracker = ctx.link_tracker();
    let uc = SavePage { tracker: &tracker };
    let page = uc
        .update(
            id,
            PageEdits {
                title: req.title,
                fields: req.fields,
            },
        )
        .await
        .map_err(status_for)?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(page.into()))
}

#[utoipa::path(delete, path = "/api/pages/{id}", tag = "Pages",
    params(("id" = i64, Path, description = "Page ID")),
    responses((status = 204, description = "Page deleted"), (status = 404, description = "Page not found")))]
pub async fn delete_page(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    let tracker = ctx.link_tracker();
    let uc = DeletePage { tracker: &tracker };
    let deleted = uc.execute(id).await.map_err(status_for)?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

#[utoipa::path(post, path = "/api/pages/{id}/sync", tag = "Pages", operation_id = "syncPageLinks",
    params(("id" = i64, Path, description = "Page ID")),
    responses((status = 200, body = PageResponse), (status = 404, description = "Page not found")))]
pub async fn sync_page(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> Result<Json<PageResponse>, StatusCode> {
    let tracker = ctx.link_tracker();
    let uc = SyncPage { tracker: &tracker };
    let page = uc.execute(id).await.map_err(status_for)?;
    Ok(Json(page.into()))
}

/// Re-synchronizes every draft that links to the page, e.g. after it was restored.
#[utoipa::path(post, path = "/api/pages/{id}/resync-dependents", tag = "Pages",
    params(("id" = i64, Path, description = "Page ID")),
    responses((status = 200, body = ResyncResponse)))]
pub async fn resync_page_dependents(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> Result<Json<ResyncResponse>, StatusCode> {
    let tracker = ctx.link_tracker();
    let uc = ResyncDependents { tracker: &tracker };
    let resynced = uc
        .execute(DependencyTarget::Page(id))
        .await
        .map_err(status_for)?;
    Ok(Json(ResyncResponse { resynced }))
}

#[utoipa::path(get, path = "/api/pages/{id}/backlinks", tag = "Pages", operation_id = "getBacklinks",
    params(("id" = i64, Path, description = "Page ID")),
    responses((status = 200, body = BacklinksResponse)))]
pub async fn get_backlinks(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> Result<Json<BacklinksResponse>, StatusCode> {
    let repo = ctx.tracking_repo();
    let uc = GetBacklinks {
        tracking: repo.as_ref(),
    };
    let items = uc.execute(id).await.map_err(status_for)?;
    let backlinks: Vec<BacklinkItem> = items
        .into_iter()
        .map(|b| BacklinkItem {
            page_id: b.page_id,
            title: b.title,
            field_names: b.field_names,
        })
        .collect();
    Ok(Json(BacklinksResponse {
        total_count: backlinks.len(),
        backlinks,
    }))
}

#[utoipa::path(get, path = "/api/pages/{id}/links", tag = "Pages", operation_id = "getOutgoingLinks",
    params(("id" = i64, Path, description = "Page ID")),
    responses((status = 200, body = OutgoingLinksResponse)))]
pub async fn get_outgoing_links(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> Result<Json<OutgoingLinksResponse>, StatusCode> {
    let repo = ctx.tracking_repo();
    let uc = GetOutgoingLinks {
        tracking: repo.as_ref(),
    };
    let items = uc.execute(id).await.map_err(status_for)?;
    let links: Vec<OutgoingLinkItem> = items
        .into_iter()
        .map(|l| OutgoingLinkItem {
            target_kind: match l.relation {
                TrackingRelation::LinkTracking => "page".to_string(),
                TrackingRelation::ImageTracking => "file".to_string(),
            },
            target_id: l.target_id,
            field_name: l.field_name,
        })
        .collect();
    Ok(Json(OutgoingLinksResponse {
        total_count: links.len(),
        links,
    }))
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/pages", post(create_page))
        .route("/pages/:id", axum::routing::put(update_page).delete(delete_page))
        .route("/pages/:id/sync", post(sync_page))
        .route("/pages/:id/resync-dependents", post(resync_page_dependents))
        .route("/pages/:id/backlinks", get(get_backlinks))
        .route("/pages/:id/links", get(get_outgoing_links))
        .with_state(ctx)
}

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::use_cases::reports::broken_links::{BrokenLinksReport, BrokenReason};
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::status_for;

#[derive(Debug, Serialize, ToSchema)]
pub struct BrokenPageItem {
    pub page_id: i64,
    pub title: String,
    pub page_type: String,
    /// Any of `broken_link`, `broken_file`.
    pub reasons: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BrokenLinksResponse {
    pub pages: Vec<BrokenPageItem>,
    pub total_count: usize,
}

#[utoipa::path(get, path = "/api/reports/broken-links", tag = "Reports",
    responses((status = 200, body = BrokenLinksResponse)))]
pub async fn broken_links(
    State(ctx): State<AppContext>,
) -> Result<Json<BrokenLinksResponse>, StatusCode> {
    let repo = ctx.page_repo();
    let uc = BrokenLinksReport {
        pages: repo.as_ref(),
    };
    let entries = uc.execute().await.map_err(status_for)?;
    let pages: Vec<BrokenPageItem> = entries
        .into_iter()
        .map(|e| BrokenPageItem {
            page_id: e.page_id,
            title: e.title,
            page_type: e.page_type,
            reasons: e
                .reasons
                .into_iter()
                .map(|r| match r {
                    BrokenReason::BrokenLink => "broken_link".to_string(),
                    BrokenReason::BrokenFile => "broken_file".to_string(),
                })
                .collect(),
        })
        .collect();
    Ok(Json(BrokenLinksResponse {
        total_count: pages.len(),
        pages,
    }))
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/reports/broken-links", get(broken_links))
        .with_state(ctx)
}

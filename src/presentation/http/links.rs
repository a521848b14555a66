use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::linktracking::descriptor::LinkDescriptor;
use crate::application::use_cases::links::audit_links::AuditLinks;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::status_for;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AuditRequest {
    pub html: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LinkItem {
    /// One of `internal_page`, `file`, `image`, `local_anchor`, `broken`, `unknown`.
    pub kind: String,
    pub target: Option<i64>,
    pub anchor: Option<String>,
    pub is_broken: bool,
}

impl From<LinkDescriptor> for LinkItem {
    fn from(d: LinkDescriptor) -> Self {
        LinkItem {
            kind: d.kind.as_str().to_string(),
            target: d.target,
            anchor: d.anchor,
            is_broken: d.is_broken,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuditResponse {
    pub links: Vec<LinkItem>,
    pub broken_count: usize,
}

/// Classifies the links in submitted markup without saving anything.
#[utoipa::path(post, path = "/api/links/audit", tag = "Links",
    request_body = AuditRequest,
    responses((status = 200, body = AuditResponse)))]
pub async fn audit_links(
    State(ctx): State<AppContext>,
    Json(req): Json<AuditRequest>,
) -> Result<Json<AuditResponse>, StatusCode> {
    let uc = AuditLinks {
        parser: ctx.link_parser(),
    };
    let links: Vec<LinkItem> = uc
        .execute(&req.html)
        .await
        .map_err(status_for)?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(AuditResponse {
        broken_count: links.iter().filter(|l| l.is_broken).count(),
        links,
    }))
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/links/audit", post(audit_links))
        .with_state(ctx)
}

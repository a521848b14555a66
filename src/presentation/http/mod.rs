use axum::http::StatusCode;

use crate::application::error::TrackingError;

pub mod files;
pub mod health;
pub mod links;
pub mod pages;
pub mod reports;

/// Maps a use case failure onto a response status, logging anything unexpected.
pub(crate) fn status_for(err: anyhow::Error) -> StatusCode {
    match err.downcast_ref::<TrackingError>() {
        Some(TrackingError::PageNotFound(_)) => StatusCode::NOT_FOUND,
        Some(TrackingError::UnknownPageType(_)) | Some(TrackingError::UnknownField { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        None => {
            tracing::error!(error = ?err, "request_failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackingError {
    #[error("page {0} not found")]
    PageNotFound(i64),
    #[error("no field schema registered for page type {0}")]
    UnknownPageType(String),
    #[error("field {field} is not declared on page type {page_type}")]
    UnknownField { page_type: String, field: String },
}

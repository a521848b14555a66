pub mod files_repository_sqlx;
pub mod link_tracking_repository_sqlx;
pub mod page_repository_sqlx;

pub mod files_repository;
pub mod link_tracking_repository;
pub mod page_repository;
pub mod url_normalizer;

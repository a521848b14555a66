pub mod delete_page;
pub mod get_backlinks;
pub mod get_outgoing_links;
pub mod resync_dependents;
pub mod save_page;
pub mod sync_page;

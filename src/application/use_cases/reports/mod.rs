pub mod broken_links;

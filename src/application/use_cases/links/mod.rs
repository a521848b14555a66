pub mod audit_links;

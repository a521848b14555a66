pub mod links;
pub mod pages;

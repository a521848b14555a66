pub mod error;
pub mod linktracking;
pub mod ports;
pub mod services;
pub mod use_cases;

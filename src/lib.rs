// Module layout (Clean Architecture style)
// - bootstrap: configuration and startup wiring
// - infrastructure: Postgres, in-memory and URL adapters
// - presentation: HTTP handlers and routing
// - application: link parsing, tracking and the use cases built on them
// - domain: pages, field schemas and tracking edges

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

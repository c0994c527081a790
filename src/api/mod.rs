//! API layer - HTTP handlers and middleware
//!
//! Routes live under `/api`; `/health`, `/swagger-ui` and the OpenAPI
//! document sit at the root.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;

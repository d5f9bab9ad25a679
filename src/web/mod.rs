//! HTTP API module for fileshelf.
//!
//! Exposes token issuance and the owner-scoped file operations over a REST
//! interface, with an OpenAPI document served by Swagger UI.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::{create_router, ApiDoc};
pub use server::WebServer;

//! Router configuration for the HTTP API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::file::FileSummary;

use super::dto::{FileEnvelope, FileListEnvelope, LoginRequest, TokenEnvelope, TokenResponse};
use super::error::{ErrorBody, ErrorCode, ErrorDetail};
use super::handlers::{self, list_files, login, read_file, upload_file, AppState};
use super::middleware::{create_cors_layer, jwt_auth, JwtState};

/// Multipart framing allowance added on top of the maximum file size.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// OpenAPI document for the HTTP API.
#[derive(OpenApi)]
#[openapi(
    info(title = "fileshelf API", description = "Owner-scoped file upload and retrieval"),
    servers((url = "/api/v1")),
    paths(
        handlers::auth::login,
        handlers::file::list_files,
        handlers::file::read_file,
        handlers::file::upload_file,
    ),
    components(schemas(
        LoginRequest,
        TokenResponse,
        TokenEnvelope,
        FileSummary,
        FileListEnvelope,
        FileEnvelope,
        ErrorBody,
        ErrorDetail,
        ErrorCode,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Token issuance"),
        (name = "files", description = "File upload, listing and download")
    )
)]
pub struct ApiDoc;

/// Registers the bearer token scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Request body limit for a given maximum file size.
pub fn body_limit_for(max_file_size: u64) -> usize {
    usize::try_from(max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES)
}

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    cors_origins: &[String],
) -> Router {
    let body_limit = body_limit_for(app_state.files.policy().max_size_bytes());

    let file_routes = Router::new()
        .route("/", get(list_files).post(upload_file))
        .route("/:id", get(read_file))
        .layer(DefaultBodyLimit::max(body_limit));

    let api_routes = Router::new()
        .route("/auth", post(login))
        .nest("/files", file_routes);

    let jwt_state_for_middleware = jwt_state.clone();

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state_for_middleware.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Create the Swagger UI router serving the OpenAPI document.
pub fn create_swagger_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

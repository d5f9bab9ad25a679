//! HTTP server for fileshelf.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::{AuthConfig, ServerConfig};
use crate::file::FileService;
use crate::{Result, ShelfError};

use super::handlers::AppState;
use super::middleware::JwtState;
use super::router::{create_health_router, create_router, create_swagger_router};

/// HTTP server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// JWT state.
    jwt_state: Arc<JwtState>,
    /// Allowed CORS origins.
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(server: &ServerConfig, auth: &AuthConfig, files: Arc<FileService>) -> Result<Self> {
        let addr = format!("{}:{}", server.host, server.port)
            .parse::<SocketAddr>()
            .map_err(|e| ShelfError::Configuration(format!("invalid server address: {e}")))?;

        let app_state = AppState::new(
            files,
            &auth.jwt_secret,
            &auth.jwt_issuer,
            auth.token_expiry_secs,
        );
        let jwt_state = Arc::new(JwtState::new(&auth.jwt_secret, &auth.jwt_issuer));

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            jwt_state,
            cors_origins: server.cors_origins.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Build the full application router.
    pub fn into_router(self) -> Router {
        create_router(self.app_state, self.jwt_state, &self.cors_origins)
            .merge(create_health_router())
            .merge(create_swagger_router())
            .layer(CompressionLayer::new())
    }

    /// Run the web server.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let addr = self.addr;
        let router = self.into_router();

        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await
    }

    /// Run the server and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let addr = self.addr;
        let router = self.into_router();

        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

//! HTTP server assembly.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::control::ControlPlane;
use crate::observability::Logger;

use super::config::HttpServerConfig;
use super::query_routes::query_routes;

/// The query-facing HTTP server.
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(plane: Arc<ControlPlane>) -> Self {
        Self::with_config(plane, HttpServerConfig::default())
    }

    pub fn with_config(plane: Arc<ControlPlane>, config: HttpServerConfig) -> Self {
        let router = Self::build_router(plane);
        Self { config, router }
    }

    fn build_router(plane: Arc<ControlPlane>) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new().nest("/api", query_routes(plane)).layer(cors)
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// The assembled router (for tests and embedding).
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until the token is cancelled.
    pub async fn start(self, shutdown: CancellationToken) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|_| std::io::Error::other("invalid socket address"))?;

        Logger::info("http server started", &[("addr", &addr.to_string())]);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
    }
}

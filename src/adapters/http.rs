//! Keep-alive HTTP server.
//!
//! Hosting platforms that idle out silent processes probe `/`; `/healthz`
//! reports the current state counts.

use axum::{extract::State, response::Json, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::domain::models::ServerConfig;
use crate::services::nudge_service::{NudgeService, ServiceStatus};

pub const ALIVE_BODY: &str = "Nudge service is alive!";

pub struct KeepAliveServer {
    config: ServerConfig,
    service: Arc<NudgeService>,
}

impl KeepAliveServer {
    pub fn new(service: Arc<NudgeService>, config: ServerConfig) -> Self {
        Self { config, service }
    }

    fn build_router(self) -> Router {
        Router::new()
            .route("/", get(alive))
            .route("/healthz", get(healthz))
            .with_state(self.service)
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let listener = TcpListener::bind(addr).await?;
        self.serve_listener(listener, shutdown).await
    }

    /// Serve on an already bound listener.
    pub async fn serve_listener<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        tracing::info!("keep-alive server listening on {}", listener.local_addr()?);
        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

async fn alive() -> &'static str {
    ALIVE_BODY
}

async fn healthz(State(service): State<Arc<NudgeService>>) -> Json<ServiceStatus> {
    Json(service.status().await)
}

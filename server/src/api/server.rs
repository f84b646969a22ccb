//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::embedded;
use super::middleware;
use super::routes::{health, plan};
use crate::core::CoreApp;
use crate::core::config::AppConfig;
use crate::core::constants::MAX_FORM_BODY_BYTES;
use crate::data::gemini::GenerationClient;

/// Read-only state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub client: Arc<dyn GenerationClient>,
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new().route("/health", get(health::health));

    Router::new()
        .route("/", get(plan::index))
        .route("/plan", post(plan::plan))
        .route("/static/{*path}", get(embedded::serve_static))
        .nest("/api/v1", api_routes)
        .fallback(middleware::handle_404)
        .layer(DefaultBodyLimit::max(MAX_FORM_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Serve until the shutdown signal fires
    pub async fn start(self, listener: TcpListener) -> Result<()> {
        let Self { app } = self;
        let shutdown = app.shutdown.clone();

        let state = AppState {
            config: app.config.clone(),
            client: app.client.clone(),
        };

        let addr = listener.local_addr()?;
        tracing::debug!(%addr, "HTTP server listening");

        axum::serve(
            listener,
            router(state).into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await
        .context("HTTP server error")?;

        tracing::debug!(graceful = shutdown.is_triggered(), "HTTP server stopped");
        Ok(())
    }
}

use crate::config::Config;
use crate::render::Renderer;
use anyhow::{Context, Result};
use axum::{
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use cine_tmdb::{MovieSource, TmdbClient};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod routes_api;
pub mod routes_pages;
pub mod routes_sessions;
pub mod sessions;

pub use sessions::{start_cleanup_task, SessionInfo, SessionManager};

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    /// Where movie data comes from
    pub source: Arc<dyn MovieSource>,
    pub renderer: Arc<Renderer>,
    /// Live-search sessions, one coordinator each
    pub sessions: SessionManager,
}

impl AppContext {
    pub fn new(config: Config, source: Arc<dyn MovieSource>) -> Result<Self> {
        let renderer = Renderer::new(config.tmdb.image_base_url.clone())?;
        let sessions = SessionManager::new(
            Arc::clone(&source),
            config.search.settings(),
            config.search.session_idle_secs,
            config.search.max_sessions,
        );

        Ok(Self {
            config: Arc::new(config),
            source,
            renderer: Arc::new(renderer),
            sessions,
        })
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_check))
        .merge(routes_pages::page_routes())
        .nest(
            "/api",
            routes_api::api_routes().merge(routes_sessions::session_routes()),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server against the configured metadata API
pub async fn start_server(config: Config) -> Result<()> {
    let client = TmdbClient::new(config.tmdb.client_options());
    if !client.has_credentials() {
        tracing::warn!("Starting without a TMDB API key; every fetch will fail");
    }
    start_server_with_source(config, Arc::new(client)).await
}

/// Start the HTTP server with an explicit movie source
pub async fn start_server_with_source(config: Config, source: Arc<dyn MovieSource>) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let ctx = AppContext::new(config, source)?;
    let sessions = ctx.sessions.clone();
    let cleanup = start_cleanup_task(sessions.clone(), Duration::from_secs(30));

    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cleanup.abort();
    sessions.shutdown_all();
    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

use crate::catalog::{CatalogClient, EpisodeExtractor};
use crate::config::Config;
use crate::metadata::JikanProvider;
use crate::resolver::{InMemoryMappingStore, Resolver};
use anyhow::{Context, Result};
use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod routes_anime;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub resolver: Arc<Resolver>,
    pub extractor: EpisodeExtractor,
    pub config: Arc<Config>,
}

impl AppContext {
    /// Wire up the resolver and extractor from configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        let static_table = config.static_table()?;
        let options = config.resolver_options();

        let provider = Arc::new(JikanProvider::new(config.metadata.base_url.clone()));
        let catalog = Arc::new(CatalogClient::new(config.catalog.base_url.clone()));
        let cache = Arc::new(InMemoryMappingStore::new());

        let resolver = Arc::new(Resolver::new(
            provider,
            catalog.clone(),
            static_table,
            cache,
            options,
        ));
        let extractor = EpisodeExtractor::new(catalog);

        Ok(Self {
            resolver,
            extractor,
            config: Arc::new(config),
        })
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", routes_anime::anime_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> &'static str {
    "ok"
}

/// Bind and serve until a shutdown signal arrives.
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let ctx = AppContext::from_config(config)?;
    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

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

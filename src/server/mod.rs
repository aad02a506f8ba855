//! HTTP server: router assembly, shared application context, and startup.
//!
//! The API lives under `/v1` behind the authentication middleware; `GET /` is
//! an unauthenticated health check. The core treats this whole layer as glue:
//! handlers resolve an owner, call the fragment service or conversion engine,
//! and map the result into the response envelope.

use anyhow::{Context, Result};
use axum::{
    http::{header, Method},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{Config, StorageBackend};
use crate::service::FragmentService;
use crate::storage::{self, StorageGateway};

pub mod auth;
pub mod error;
pub mod openapi;
pub mod routes;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub service: FragmentService,
    pub config: Arc<Config>,
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::IF_MATCH]);

    let api = Router::new()
        .route(
            "/fragments",
            get(routes::list_fragments).post(routes::create_fragment),
        )
        .route(
            "/fragments/:id",
            get(routes::get_fragment)
                .put(routes::put_fragment)
                .delete(routes::delete_fragment),
        )
        .route("/fragments/:id/info", get(routes::get_fragment_info))
        .layer(middleware::from_fn_with_state(
            ctx.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        // Health check
        .route("/", get(health_check))
        // API routes (always behind owner resolution)
        .nest("/v1", api)
        // OpenAPI documentation (Swagger UI at /docs)
        .merge(openapi::openapi_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Health check: the server is up. Clients shouldn't cache this response.
async fn health_check() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "no-cache")],
        Json(serde_json::json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "hostname": gethostname::gethostname().to_string_lossy(),
        })),
    )
}

/// Build the storage gateway named by the configuration.
pub fn build_gateway(config: &Config) -> Result<StorageGateway> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory storage (fragments are lost on restart)");
            Ok(StorageGateway::memory())
        }
        StorageBackend::Sqlite => {
            let path = config.storage.db_path.to_string_lossy();
            tracing::info!("Using SQLite storage at {path}");
            let pool = storage::init_pool(&path)
                .with_context(|| format!("Failed to open database at {path}"))?;
            Ok(StorageGateway::sqlite(pool))
        }
    }
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let gateway = build_gateway(&config)?;
    let ctx = AppContext {
        service: FragmentService::new(gateway),
        config: Arc::new(config),
    };

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

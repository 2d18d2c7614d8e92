//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - gzip response compression
//! - OpenAPI document at /api-docs
//! - Tracing, timeout and panic-catching middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::any::Any;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use roster_core::config::ServerSection;
use roster_core::{Roster, RosterConfig};

use super::error::ApiError;
use super::{docs, routes};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub roster: Roster,
}

/// Build the application router with all routes and middleware.
pub fn router(roster: Roster, config: &ServerSection) -> Router {
    let cors = if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        // Localhost only
        let port = config.port;
        let origins = [
            format!("http://localhost:{}", port),
            format!("http://127.0.0.1:{}", port),
            "http://localhost:3000".to_owned(),
            "http://127.0.0.1:3000".to_owned(),
        ];
        CorsLayer::new()
            .allow_origin(
                origins
                    .iter()
                    .filter_map(|o| HeaderValue::from_str(o).ok())
                    .collect::<Vec<_>>(),
            )
            .allow_methods(AnyOrigin)
            .allow_headers(AnyOrigin)
    };

    let state = Arc::new(AppState { roster });

    Router::new()
        .merge(routes::health::router())
        .merge(routes::register::router())
        .merge(routes::students::router())
        .merge(routes::notifications::router())
        .merge(docs::router())
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Turn a handler panic into the generic 500 body.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");

    ApiError::Internal {
        message: format!("handler panicked: {}", detail),
    }
    .into_response()
}

/// Run the HTTP server until Ctrl+C / SIGTERM.
///
/// # Example
///
/// ```ignore
/// let roster = Roster::new(Arc::new(PgStore::new(pool)));
/// run_server(roster, &RosterConfig::load(None)?).await?;
/// ```
pub async fn run_server(roster: Roster, config: &RosterConfig) -> Result<(), ServerError> {
    let app = router(roster, &config.server);

    // Bind listener
    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Run with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration for the note endpoints
//! - Middleware stack (security headers, logging, compression, CORS)
//! - Tracing subscriber installation
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::middleware::{log_requests, request_id, secure_headers};
use crate::routes::{method_not_allowed, not_found, notes};
use crate::state::ServerState;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// CORS restricted to the configured origins; `*` opens it to any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::POST,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers(AllowHeaders::mirror_request())
}

/// Build the Axum router with all routes and middleware
///
/// Middleware, outermost first:
/// 1. HTTP tracing spans
/// 2. Request ID tracking
/// 3. Request logging
/// 4. Security headers
/// 5. CORS
/// 6. Compression
/// 7. Timeout handling
/// 8. Body size limit
pub fn build_router(state: Arc<ServerState>) -> Router {
    let config = Arc::clone(&state.config);

    Router::new()
        .route("/", get(notes::list_notes).post(notes::create_note))
        .route(
            "/{id}",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(DefaultBodyLimit::max(config.max_body_size()))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.timeout(),
        ))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&config.cors_origins))
        .layer(from_fn(secure_headers))
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set. Calling this twice is
/// harmless; the second subscriber is ignored.
pub fn init_tracing(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = if config.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Start the notekeep HTTP server
///
/// Sets up logging, opens the configured store, binds the listener and serves
/// until SIGTERM or Ctrl+C.
///
/// # Example
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    init_tracing(&config);

    let state = Arc::new(ServerState::new(config.clone())?);
    let app = build_router(state);

    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        "Starting notekeep server on {} with {:?} storage",
        addr,
        config.storage.backend
    );
    tracing::info!(
        "Timeout: {}s, Max body: {}KiB, CORS origins: {:?}",
        config.timeout_secs,
        config.max_body_size_kb,
        config.cors_origins
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}

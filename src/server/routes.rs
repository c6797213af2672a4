//! Axum routes for the static file server

use crate::config::ServeConfig;
use crate::error::{ServeError, ServeResult};
use crate::server::resolve::{content_type, extension, resolve};
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue};
use axum::response::Response;
use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// One year, the site is rebuilt with content-hashed assets
const CACHE_CONTROL: &str = "public, max-age=31536000";

/// Shared application state
pub struct AppState {
    /// Absolute path of the served directory
    pub root: PathBuf,
}

// ─── Route builder ───────────────────────────────────────────────

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(serve_file)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─── Handlers ────────────────────────────────────────────────────

async fn serve_file(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> ServeResult<Response> {
    let raw_path = request.uri().path().to_string();
    let url_path = urlencoding::decode(&raw_path)
        .map_err(|_| ServeError::NotFound(raw_path.clone()))?
        .into_owned();

    let root = state.root.clone();
    let lookup = url_path.clone();
    let path = tokio::task::spawn_blocking(move || resolve(&root, &lookup))
        .await
        .map_err(|e| ServeError::Io(std::io::Error::other(e)))?
        .inspect_err(|e| debug!(path = %url_path, error = %e, "Request rejected"))?;

    // ServeFile handles HEAD, Range and conditional requests
    let response = match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    };

    let (mut parts, body) = response.into_parts();
    parts
        .headers
        .insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL));
    parts
        .headers
        .insert(header::VARY, HeaderValue::from_static("Accept-Encoding"));
    if parts.status.is_success() {
        if let Some(mime) = extension(&path).as_deref().and_then(content_type) {
            parts
                .headers
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(mime));
        }
    }

    Ok(Response::from_parts(parts, body))
}

// ─── Server startup ──────────────────────────────────────────────

/// Start the static file server
pub async fn serve(config: &ServeConfig) -> ServeResult<()> {
    let root = match std::fs::metadata(&config.root) {
        Ok(meta) if meta.is_dir() => std::fs::canonicalize(&config.root)?,
        _ => return Err(ServeError::MissingRoot(config.root.clone())),
    };

    let addr: SocketAddr = format!("{}:{}", config.bind, config.port)
        .parse()
        .map_err(|e: std::net::AddrParseError| ServeError::InvalidAddress {
            addr: format!("{}:{}", config.bind, config.port),
            reason: e.to_string(),
        })?;

    let router = build_router(Arc::new(AppState { root: root.clone() }));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        root = %root.display(),
        "Serving files on http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutting down gracefully...");
}

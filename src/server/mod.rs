//! HTTP server assembly: shared context, router, startup, and shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::store::ImageStore;

pub mod error;
pub mod extract;
pub mod routes_images;
pub mod routes_transform;

/// Shared application context passed to all request handlers.
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<ImageStore>,
    pub config: Arc<Config>,
    /// Render handle for the Prometheus endpoint. Absent when a recorder was
    /// already installed elsewhere in the process.
    pub metrics: Option<PrometheusHandle>,
}

/// Build the shared context for a server instance.
pub fn build_context(config: Config) -> Result<AppContext> {
    let store = ImageStore::open(&config.storage.upload_dir).with_context(|| {
        format!(
            "Failed to open upload directory {}",
            config.storage.upload_dir.display()
        )
    })?;

    Ok(AppContext {
        store: Arc::new(store),
        config: Arc::new(config),
        metrics: install_metrics_recorder(),
    })
}

/// Create the Axum router with all routes.
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let max_body = ctx.config.limits.max_upload_bytes;

    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/upload", post(routes_images::upload))
        .route("/image/{filename}", get(routes_images::get_image))
        .route("/images", get(routes_images::list_images))
        .route("/upscale/{filename}", get(routes_transform::upscale_stored))
        .route(
            "/downscale/{filename}",
            get(routes_transform::downscale_stored),
        )
        .route("/invert/{filename}", get(routes_transform::invert_stored))
        .route("/upscale", post(routes_transform::upscale_batch))
        .route("/downscale", post(routes_transform::downscale_batch))
        .route("/invert", post(routes_transform::invert_batch))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Start the HTTP server and block until shutdown.
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let ctx = build_context(config)?;
    let app = create_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn home() -> &'static str {
    "Welcome to the Image Processing API!"
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// GET /metrics
async fn metrics_handler(State(ctx): State<AppContext>) -> impl IntoResponse {
    let body = match &ctx.metrics {
        Some(handle) => handle.render(),
        None => String::from("# metrics recorder unavailable\n"),
    };
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}

/// Install the process-wide Prometheus recorder and describe our metrics.
/// Installation fails when a recorder already exists, in which case the
/// endpoint reports that rendering is unavailable.
fn install_metrics_recorder() -> Option<PrometheusHandle> {
    let handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => handle,
        Err(e) => {
            tracing::warn!("Failed to install metrics recorder: {}", e);
            return None;
        }
    };

    metrics::describe_counter!(
        "pixelforge_uploads_total",
        "Number of images persisted through /upload"
    );
    metrics::describe_counter!(
        "pixelforge_batch_requests_total",
        "Number of batch transform requests served"
    );
    metrics::describe_histogram!(
        "pixelforge_transform_duration_seconds",
        "Time spent decoding, transforming, and re-encoding one image"
    );

    Some(handle)
}

/// Wait for SIGINT or SIGTERM so in-flight requests can drain. A failed
/// handler installation parks its branch forever instead of resolving the
/// select and shutting the server down at startup.
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
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

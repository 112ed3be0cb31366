use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdfmeta_pdf_lopdf::LopdfBackend;

mod handlers;
mod models;
mod state;
mod template;
mod upload;

use state::{AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = pdfmeta_core::config_file::load_config();
    let settings = Settings::resolve(&config, |key| std::env::var(key).ok())
        .context("Failed to resolve server settings")?;

    let backend = LopdfBackend::new().with_xmp(settings.include_xmp);
    let bind = settings.bind;
    let mount = if settings.base_path.is_empty() {
        "/".to_string()
    } else {
        settings.base_path.clone()
    };

    let state = Arc::new(AppState {
        backend: Arc::new(backend),
        settings,
    });

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    tracing::info!(%bind, %mount, "Listening on http://{}{}", bind, mount);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Build the router, mounted under the configured base path.
fn app(state: Arc<AppState>) -> Router {
    let body_limit = DefaultBodyLimit::max(state.settings.max_upload_bytes());
    let base_path = state.settings.base_path.clone();

    let routes = Router::new()
        .route("/", get(handlers::index::index))
        .route("/api/extract", post(handlers::extract::extract))
        .route("/api/export", post(handlers::export::export))
        .route("/health", get(|| async { "ok" }))
        .layer(body_limit)
        .with_state(state);

    let router = if base_path.is_empty() {
        routes
    } else {
        Router::new().nest(&base_path, routes)
    };
    router.layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

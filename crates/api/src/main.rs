use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use charvid_api::config::ServerConfig;
use charvid_api::router::build_app_router;
use charvid_api::state::AppState;
use charvid_core::store::MemoryJobStore;
use charvid_svd::{RetryConfig, SvdClient};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "charvid_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Asset buckets ---
    std::fs::create_dir_all(&config.uploads_dir).expect("Failed to create uploads directory");
    std::fs::create_dir_all(&config.videos_dir).expect("Failed to create videos directory");

    // --- Inference client ---
    let svd = match &config.hf_token {
        Some(token) => {
            tracing::info!(api_url = %config.hf_api_url, "Inference API client configured");
            Some(Arc::new(SvdClient::new(
                config.hf_api_url.clone(),
                token.clone(),
            )))
        }
        None => {
            tracing::warn!("No inference token provided; jobs will use the fallback generator");
            None
        }
    };

    // --- App state ---
    let state = AppState {
        store: Arc::new(MemoryJobStore::new()),
        svd,
        retry: Arc::new(RetryConfig::default()),
        config: Arc::new(config.clone()),
    };

    // --- Router ---
    let app = build_app_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

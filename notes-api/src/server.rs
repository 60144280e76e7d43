//! Server setup and lifecycle for the clinical notes service.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

use config::{load_from_env, verify_at_startup, Config};

use crate::error::{ApiError, Result};
use crate::routes::create_router;
use crate::state::AppState;

/// Runs the HTTP server with the given configuration.
///
/// Blocks until the server is shut down (ctrl-c or SIGTERM).
pub async fn run_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.service.host, config.service.port)
        .parse()
        .map_err(|e| ApiError::Server(format!("Invalid bind address: {e}")))?;

    let environment = config.environment;
    let state = Arc::new(AppState::new(config)?);
    let router = create_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| ApiError::Server(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!(%addr, %environment, "Clinical notes service starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Server(format!("Server error: {e}")))?;

    tracing::info!("Clinical notes service stopped");
    Ok(())
}

/// Initialize tracing, load configuration from the environment, and run.
pub async fn run_from_env() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    let config = load_from_env()?;
    verify_at_startup(&config)?;
    run_server(config).await
}

/// Signal handler for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}

//! Serve command - HTTP API over a shared cache

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use crate::api::{create_router, AppState};
use crate::config::AppConfig;
use crate::infrastructure::observability::init_metrics;

/// Run the API server until Ctrl+C or SIGTERM
///
/// With `snapshot.path` set, the cache is restored before binding and saved
/// after the server drains.
pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    let service = Arc::new(crate::build_response_service(&config)?);

    if let Some(path) = &config.snapshot.path {
        service.restore_snapshot(path).await?;
    }

    let metrics = init_metrics(&config.metrics);
    let app = create_router(AppState::new(service.clone()), metrics, &config.metrics.path);

    let addr = build_socket_addr(&config)?;
    info!(%addr, generator = service.generator_name(), "Starting API server");

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(path) = &config.snapshot.path {
        let saved = service.save_snapshot(path).await?;
        info!(path = %path.display(), saved, "Saved cache before exit");
    }

    info!("API server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}

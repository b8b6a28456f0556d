use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::errors::Error;

use super::routes::{build_router, ApiState};

/// Bind `addr` and serve the API until Ctrl-C.
pub async fn start_api_server(addr: SocketAddr, state: ApiState) -> crate::Result<()> {
    let listener = TcpListener::bind(addr).await.map_err(|e| Error::Io {
        source: e,
        context: format!("Failed to bind API server on {}", addr),
    })?;

    serve(listener, state, shutdown_signal()).await
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: ApiState, shutdown: F) -> crate::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let router: Router = build_router(state);
    let local_addr = listener.local_addr().map_err(|e| Error::Io {
        source: e,
        context: "Failed to read API listener address".to_string(),
    })?;

    info!(address = %local_addr, "Starting HTTP API server");
    axum::serve(listener, router).with_graceful_shutdown(shutdown).await.map_err(|e| {
        Error::Io { source: e, context: "API server error".to_string() }
    })?;

    info!("API server shutdown completed");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "API server shutdown listener failed");
    }
}

//! HTTP server module for the booking service.
//!
//! This module provides the Axum-based HTTP server with:
//! - Application state management
//! - Router configuration
//! - Graceful shutdown handling

pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;

use tokio::signal;

/// Resolves when the process receives Ctrl+C or SIGTERM.
///
/// If a handler cannot be installed the failure is logged and that signal
/// is ignored.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(error = %error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(error) => {
                tracing::error!(error = %error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}

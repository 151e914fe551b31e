//! Broom Fairy booking HTTP server.

use broom_fairy_bookings::bootstrap::{Storage, build_state};
use broom_fairy_bookings::config::{Config, StorageConfig};
use broom_fairy_bookings::metrics::register_business_metrics;
use broom_fairy_bookings::server::{build_router, shutdown_signal};
use broom_fairy_core::environment::SystemClock;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    if let Err(error) = dotenvy::dotenv() {
        if !error.not_found() {
            return Err(error.into());
        }
    }

    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.server.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Broom Fairy booking server");
    info!(
        backend = match config.storage {
            StorageConfig::Memory => "memory",
            StorageConfig::Postgres(_) => "postgres",
        },
        cancellation_window_hours = config.bookings.cancellation_window_hours,
        "Configuration loaded"
    );

    // Metrics
    let metrics_addr: SocketAddr = config.metrics_address().parse()?;
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()?;
    register_business_metrics();
    info!(address = %metrics_addr, "Prometheus exporter listening");

    // Storage and application state
    let storage = Storage::connect(&config.storage).await?;
    let state = build_state(storage, Arc::new(SystemClock), &config.bookings);
    let app = build_router(state);

    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "HTTP server listening");

    // Run server with graceful shutdown; give in-flight requests a bounded grace period
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout);
    let server = async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    };

    tokio::select! {
        result = server => result?,
        () = async {
            shutdown_signal().await;
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            warn!(timeout_secs = shutdown_timeout.as_secs(), "Graceful shutdown timed out");
        },
    }

    info!("Server shut down");
    Ok(())
}

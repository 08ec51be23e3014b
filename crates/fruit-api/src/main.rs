//! Axum API server binary.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::sync::watch;
use tracing::{info, warn};

use fruit_api::shutdown::{run_with_grace, shutdown_signal, ShutdownOutcome};
use fruit_api::{create_router, logging, metrics, ApiConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env();
    logging::init_tracing(&config.log)?;

    info!("Starting fruit-api");
    info!(
        host = %config.host,
        port = config.port,
        environment = %config.environment,
        default_source = %config.default_source,
        banana_policy = %config.banana_policy,
        external_enabled = config.roboflow.is_configured(),
        "API config loaded"
    );

    let state = AppState::new(config.clone()).context("failed to create application state")?;

    let metrics_handle = if config.metrics_enabled {
        info!("Prometheus metrics enabled at /metrics");
        Some(metrics::init_metrics().context("failed to install Prometheus recorder")?)
    } else {
        None
    };

    let app = create_router(state, metrics_handle);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.host, config.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    let (stop_tx, stop_rx) = watch::channel(false);
    let server = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = stop_tx.send(true);
        });

    match run_with_grace(server, stop_rx, config.shutdown_timeout)
        .await
        .context("server error")?
    {
        ShutdownOutcome::Drained => info!("Server shutdown complete"),
        ShutdownOutcome::TimedOut => warn!("Server shutdown forced after grace period"),
    }

    Ok(())
}

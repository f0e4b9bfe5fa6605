use std::net::{Ipv4Addr, SocketAddr};

use portal_link::{app, config, initialize_state, telemetry};
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // load `.env` before reading configuration.
    dotenvy::dotenv().ok();

    let (config, read_error) = match config::Configuration::default().read() {
        Ok(config) => (config, None),
        Err(err) => (config::Configuration::default(), Some(err)),
    };

    // `LOG_LEVEL` is applied again by `with_env`, but logging must be ready
    // before environment overrides report invalid values.
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| config.log_level.clone());
    telemetry::setup_logging(&log_level);

    if let Some(err) = read_error {
        tracing::error!(%err, "`config.yaml` file cannot be read, using defaults");
    }
    let config = config.with_env();

    let metrics = match telemetry::setup_metrics_recorder() {
        Ok(handle) => Some(handle),
        Err(err) => {
            tracing::warn!(%err, "prometheus recorder not installed");
            None
        },
    };

    let port = config.port;
    let state = initialize_state(config, metrics).await?;

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server started");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(%err, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(err) => {
                tracing::error!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

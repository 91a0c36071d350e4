use std::sync::Arc;

use anyhow::Context;

use unitsvc_api::app::{build_app, build_debug_app, services};
use unitsvc_infra::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    unitsvc_observability::init();

    let config = Config::from_env().context("invalid configuration")?;
    let services = Arc::new(
        services::build_services(&config)
            .await
            .context("failed to initialise services")?,
    );

    let app = build_app(services.clone());
    let debug_app = build_debug_app(services.metrics.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    let debug_listener = tokio::net::TcpListener::bind(config.debug_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.debug_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "api listening");
    tracing::info!(addr = %debug_listener.local_addr()?, "debug listening");

    let api = async {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("api server failed")
    };
    let debug = async {
        axum::serve(debug_listener, debug_app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("debug server failed")
    };

    tokio::try_join!(api, debug)?;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

//! agenda-gateway server entry point.
//!
//! Restores the last snapshot, starts the Axum HTTP server with REST and
//! WebSocket endpoints, and snapshots periodically and on shutdown.

use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use agenda_gateway::api;
use agenda_gateway::app_state::AppState;
use agenda_gateway::config::{GatewayConfig, LogFormat};
use agenda_gateway::domain::EventBus;
use agenda_gateway::persistence::SnapshotStore;
use agenda_gateway::service::{ScheduleState, SchedulingService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env().context("invalid LISTEN_ADDR")?;
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting agenda-gateway");

    let store = config
        .persistence_enabled
        .then(|| SnapshotStore::new(config.data_dir.clone()));
    let event_bus = EventBus::new(config.event_bus_capacity);
    let service = SchedulingService::new(ScheduleState::default(), event_bus, store);

    if let Some((users, meetings)) = service
        .restore_snapshot()
        .await
        .context("failed to restore snapshot")?
    {
        tracing::info!(users, meetings, dir = %config.data_dir.display(), "state restored");
    }

    let app_state = AppState::new(service);
    let service = std::sync::Arc::clone(&app_state.scheduling_service);

    if config.persistence_enabled && config.snapshot_interval_secs > 0 {
        let service = std::sync::Arc::clone(&service);
        let period = Duration::from_secs(config.snapshot_interval_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(err) = service.save_snapshot().await {
                    tracing::warn!(error = %err, "periodic snapshot failed");
                }
            }
        });
    }

    let app = api::build_app(app_state, Duration::from_secs(config.request_timeout_secs));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("cannot bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    service
        .save_snapshot()
        .await
        .context("final snapshot failed")?;
    tracing::info!("shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

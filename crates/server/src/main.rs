mod admin;
mod bootstrap;
mod email;
mod health;

use anyhow::Result;
use maildesk_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use maildesk_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;
    let bind = format!("{}:{}", app.config.server.bind_address, app.config.server.port);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(
        event_name = "server_started",
        bind_address = %bind,
        "maildesk-server listening"
    );

    let router = bootstrap::router(&app);
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!(event_name = "server_stopping", "shutdown signal received");
    let _ = shutdown_tx.send(());

    let grace = std::time::Duration::from_secs(app.config.server.graceful_shutdown_secs);
    match tokio::time::timeout(grace, server).await {
        Ok(joined) => joined??,
        Err(_) => {
            tracing::warn!(
                event_name = "server_shutdown_deadline_exceeded",
                grace_secs = app.config.server.graceful_shutdown_secs,
                "in-flight requests did not drain in time"
            );
        }
    }

    tracing::info!(event_name = "server_stopped", "maildesk-server stopped");
    Ok(())
}

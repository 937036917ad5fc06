//! Serve command implementation.

use anyhow::{Context, Result};
use signal_broadcast::{serve, ShutdownSignal, SignalHub};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::{build_scheduler, load};
use crate::cli::ServeArgs;

pub async fn run(args: ServeArgs, config_path: &Path) -> Result<()> {
    let config = load(config_path)?;
    let bind = match args.bind {
        Some(addr) => addr,
        None => config.server.socket_addr()?,
    };

    let hub = Arc::new(SignalHub::new(config.server.channel_capacity));
    let scheduler = Arc::new(build_scheduler(&config, Arc::clone(&hub), None)?);

    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    let shutdown = ShutdownSignal::new();
    let mut server = tokio::spawn(serve(listener, Arc::clone(&hub), shutdown.listener()));
    let scheduler = scheduler.start();

    info!(
        app = %config.app.name,
        environment = %config.app.environment,
        address = %bind,
        "Signal service running, press Ctrl-C to stop"
    );

    let server_result = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            info!("Shutdown requested");
            shutdown.trigger();
            None
        }
        result = &mut server => {
            error!("WebSocket server exited unexpectedly");
            shutdown.trigger();
            Some(result)
        }
    };

    scheduler.stop().await;

    let result = match server_result {
        Some(result) => result,
        None => server.await,
    };
    result.context("WebSocket server task failed")??;

    info!("Signal service stopped");
    Ok(())
}

//! HORUS TF Publisher
//!
//! Periodically republishes one parent -> child transform. The transform can
//! be edited while running through `field=value` lines on stdin.

mod cli;
mod config;
mod console;

use clap::Parser;
use cli::{Args, TransformArgs};
use config::{OutputKind, PublisherConfig};
use horus_tf::{
    JsonLinesBroadcaster, LogBroadcaster, ReconfigureController, ReconfigureServer,
    TransformBroadcaster, TransformSender,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        "horus_tf=debug,horus_tf_publisher=debug,info"
    } else {
        "horus_tf=info,horus_tf_publisher=info"
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config = PublisherConfig::resolve(&args)?;

    let transform = TransformArgs::parse(&args.values)?;
    let period = transform.period;

    let mut state = transform.into_state()?;
    state.set_angle_units(config.angle_units);
    let state = state.into_shared();

    let server = Arc::new(ReconfigureServer::new(ReconfigureController::new(
        state.clone(),
    )));

    let broadcaster: Box<dyn TransformBroadcaster> = match config.output {
        OutputKind::Log => Box::new(LogBroadcaster),
        OutputKind::Json => Box::new(JsonLinesBroadcaster::stdout()),
    };
    let sender = TransformSender::new(state, broadcaster, period)?;

    if config.console {
        console::spawn(server.clone())?;
        info!("Reading edits from stdin (type 'help' for fields)");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl+C received! Shutting down transform publisher...");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                warn!("Failed to set signal handler: {}", e);
                // Keep the sender alive so the publish loop keeps running
                std::future::pending::<()>().await;
            }
        }
    });

    sender.run(shutdown_rx).await;
    Ok(())
}

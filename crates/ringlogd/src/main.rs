//! ringlogd - bounded in-memory record log over TCP
//!
//! Usage:
//!   # Defaults: listen on 0.0.0.0:9000, keep 10 records, timestamp every 10s
//!   ringlogd
//!
//!   # Custom port and capacity, no timestamps
//!   ringlogd --port 9010 --capacity 32 --heartbeat-secs 0

use clap::Parser;
use ringlogd::{Cli, Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = cli.validate() {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let server = Server::new(cli.to_config()).await?;
    let shutdown_tx = server.shutdown_handle();

    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        tracing::info!("Caught signal, exiting");
        if shutdown_tx.send(()).is_err() {
            tracing::error!("Shutdown channel closed, signal not delivered");
        }
    });

    server.start().await
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sig) => sig,
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                let _ = ctrl_c.await;
                return;
            }
        };

        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}

// src/main.rs
use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use infra_probe::{
    config,
    handlers::ProbeContext,
    server::{RequestHandler, ServerBuilder},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("infra_probe=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    // Environment is read exactly once, here.
    let config = config::load_config()?;
    info!(
        listen = %config.listen_addr,
        db_host = %config.database.host,
        mount = %config.filesystem.mount_path.display(),
        "starting infrastructure probe"
    );

    let context = Arc::new(ProbeContext::new(&config));
    let handler = RequestHandler::new(context);

    ServerBuilder::new(config.listen_addr)
        .with_handler(handler)
        .bind()
        .await?
        .serve_with_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

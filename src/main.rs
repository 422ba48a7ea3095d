use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use report_me::{ config::logging::init_logging, initialize_app, Config };

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let config: Config = Config::new().context("Failed to load configuration")?;
    let addr: SocketAddr = config.server.socket_addr()?;
    info!(
        backend = ?config.database.backend,
        paginator = ?config.paginator,
        "Configuration loaded"
    );

    let app = initialize_app(config).await.context("Failed to initialize application")?;

    let listener: tokio::net::TcpListener = tokio::net::TcpListener
        ::bind(addr).await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

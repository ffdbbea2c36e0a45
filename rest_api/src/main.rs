use anyhow::Result;
use tokio::sync::oneshot;
use tracing::info;

use rest_api::{load_rest_api_config, start_server};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = load_rest_api_config(None)?;
    info!(
        "HealthFlow REST API starting on http://{}:{}",
        config.host, config.port
    );

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down.");
            let _ = shutdown_tx.send(());
        }
    });

    start_server(&config, shutdown_rx).await
}

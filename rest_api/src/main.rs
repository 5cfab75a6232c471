// rest_api/src/main.rs

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::{error, info};
use rest_api::{load_rest_api_config, start_server};
use tokio::sync::oneshot;

/// Hospital management REST API server
#[derive(Parser, Debug)]
#[command(name = "hospital-api")]
#[command(version = "0.1.0")]
#[command(about = "Hospital management REST API")]
struct CliArgs {
    /// YAML configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE", env = "REST_API_CONFIG")]
    config: Option<PathBuf>,
    /// Address to bind
    #[arg(long = "host", value_name = "HOST")]
    host: Option<String>,
    /// Port to listen on
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let args = CliArgs::parse();
    let mut config = load_rest_api_config(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    info!(
        "Starting hospital API on {}:{} (model {}, database {})",
        config.host, config.port, config.ai_model, config.database_url
    );

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received, shutting down."),
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
        let _ = shutdown_tx.send(());
    });

    start_server(config, shutdown_rx).await
}

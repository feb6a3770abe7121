//! Request-dispatch gateway (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ axum catch-all ──▶ PARSE ──▶ BEFORE_EXEC ──▶ function | resource handler
//!                                                                           │
//!     Client Response                                                       ▼
//!     ◀────────────── RESPOND ◀──────────────────────────────────────── AFTER_EXEC
//!                        │
//!                        └──▶ FINAL (spawned, not awaited)
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use dispatch_gateway::config::{self, GatewayConfig};
use dispatch_gateway::lifecycle::{build_dispatcher, Shutdown};
use dispatch_gateway::observability::{logging, metrics};
use dispatch_gateway::HttpServer;

#[derive(Parser, Debug)]
#[command(
    name = "dispatch-gateway",
    version,
    about = "Interceptor-driven request dispatch gateway"
)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    config::validate_config(&config).map_err(config::ConfigError::Validation)?;

    logging::init(&config.observability)?;

    tracing::info!("dispatch-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        files_prefix = %config.files.resource_prefix,
        max_body_size = config.limits.max_body_size,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let dispatcher = build_dispatcher(&config);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, dispatcher);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

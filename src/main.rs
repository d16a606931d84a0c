//! league-gateway entrypoint.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!                    │                 LEAGUE GATEWAY                 │
//!  Client Request    │  ┌────────┐   ┌─────────┐   ┌──────────────┐  │
//!  ──────────────────┼─▶│  http  │──▶│ routes  │──▶│  dispatch    │──┼──▶ org-svc
//!                    │  │ server │   │ (prefix)│   │  (breaker)   │  │    quiz-svc
//!  Client Response   │  └────────┘   └─────────┘   └──────┬───────┘  │    results-svc
//!  ◀─────────────────┼──────────────────────────────────── ┘         │
//!                    │                                               │
//!                    │  breaker state ──▶ shared store (all replicas)│
//!                    │  config / admin / observability cross-cutting │
//!                    └───────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use league_gateway::config::{load_config, GatewayConfig};
use league_gateway::http::HttpServer;
use league_gateway::observability::{logging, metrics};
use league_gateway::store::{MemoryStore, SharedStore};

#[derive(Parser)]
#[command(name = "league-gateway")]
#[command(about = "Gateway fronting the organization, quiz/team/league and results services", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init_tracing(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        services = config.services.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "configuration loaded"
    );

    if config.admin.enabled && config.admin.api_key.is_empty() {
        tracing::warn!("admin endpoints enabled without an api key");
    }

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "listening for connections");

    let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
    let server = HttpServer::new(config, store);
    server.run(listener).await?;

    tracing::info!("shutdown complete");
    Ok(())
}

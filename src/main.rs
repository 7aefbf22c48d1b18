//! Interview router
//!
//! Tracks the health of a set of LLM backends and picks a healthy one for
//! each interview simulation, falling back when the requested model is down.
//!
//! # Architecture Overview
//!
//! ```text
//!                              ┌──────────────────────────────────────────────────────┐
//!                              │                  INTERVIEW ROUTER                     │
//!                              │                                                       │
//!     Client Request           │  ┌─────────┐    ┌───────────┐    ┌──────────────┐    │
//!     ─────────────────────────┼─▶│  http   │───▶│ fallback  │───▶│   registry   │    │
//!                              │  │ server  │    │ selector  │    │ (health recs)│    │
//!                              │  └────┬────┘    └─────┬─────┘    └──────▲───────┘    │
//!                              │       │               │                 │            │
//!                              │       │               ▼                 │            │
//!                              │       │         ┌───────────┐    ┌──────┴───────┐    │
//!                              │       │         │ fallback  │    │   health     │    │
//!                              │       │         │   log     │    │ monitor +    │    │
//!                              │       │         └───────────┘    │   prober     │    │
//!                              │       ▼                          └──────┬───────┘    │
//!     Client Response          │  ┌──────────────────────────────┐      │            │
//!     ◀────────────────────────┼──│          executor            │◀─────┘            │
//!                              │  │  (agent process per call)    │───────────────────┼──── LLM
//!                              │  └──────────────────────────────┘                   │     Provider
//!                              │                                                       │
//!                              │  ┌────────────────────────────────────────────────┐  │
//!                              │  │            Cross-Cutting Concerns               │  │
//!                              │  │  ┌─────────┐ ┌──────────────┐ ┌─────────────┐  │  │
//!                              │  │  │ config  │ │observability │ │  lifecycle  │  │  │
//!                              │  │  └─────────┘ └──────────────┘ └─────────────┘  │  │
//!                              │  └────────────────────────────────────────────────┘  │
//!                              └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use interview_router::config::load_config;
use interview_router::executor::ProcessExecutor;
use interview_router::lifecycle::signals::wait_for_signal;
use interview_router::observability::{logging, metrics};
use interview_router::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "interview-router")]
#[command(about = "Health-aware LLM backend router for interview simulations", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "ROUTER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_tracing(&config.observability);

    tracing::info!("interview-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = config.backends.len(),
        max_latency_ms = config.health.max_latency_ms,
        ttl_ms = config.health.ttl_ms,
        interval_ms = config.health.interval_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let executor = Arc::new(ProcessExecutor::new(config.executor.clone()));
    let server = HttpServer::new(config, executor)?;

    let shutdown = Shutdown::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            wait_for_signal().await;
            tracing::info!("Shutdown signal received");
            shutdown.trigger();
        }
    });

    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

//! Contact form relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────┐
//!                          │                REQUEST RELAY                 │
//!                          │                                              │
//!   POST /api/request      │  ┌──────────┐   ┌───────────┐   ┌─────────┐  │
//!   ───────────────────────┼─▶│   rate   │──▶│ validator │──▶│ notifier│──┼──▶ SMTP relay
//!                          │  │  limiter │   │           │   │         │  │
//!                          │  └────┬─────┘   └─────┬─────┘   └────┬────┘  │
//!                          │       │ 429           │ 400          │ 502   │
//!   ◀──────────────────────┼───────┴───────────────┴──────────────┘       │
//!                          │                 200 {"success": true}        │
//!                          │                                              │
//!                          │  config · logging · metrics · shutdown       │
//!                          └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use request_relay::config::load_config;
use request_relay::lifecycle::{shutdown_signal, Shutdown};
use request_relay::observability::{logging, metrics};
use request_relay::HttpServer;

#[derive(Parser)]
#[command(name = "request-relay")]
#[command(about = "Relays contact form submissions to a mailbox", long_about = None)]
struct Cli {
    /// Optional TOML configuration file. Environment variables override it.
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("request-relay v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address(),
        window_secs = config.rate_limit.window_secs,
        max_requests = config.rate_limit.max_requests,
        transport = ?config.mail.transport,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Address already checked by config validation.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(
        "server listening at http://{}",
        listener.local_addr()?
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

//! Quotation relay server.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌───────────────────────────────────────────────┐
//!                        │                 QUOTE RELAY                   │
//!   quote-client         │  ┌──────────┐    ┌──────────────────┐         │
//!   ─────────────────────┼─▶│  http    │───▶│ QuotationService │         │
//!   GET /cotacao         │  │ /cotacao │    └───┬─────────┬────┘         │
//!   (300ms budget)       │  └──────────┘        │         │              │
//!                        │                      ▼         ▼              │
//!                        │            ┌──────────────┐ ┌──────────────┐  │
//!                        │            │UpstreamFetch │ │QuotationStore│  │
//!                        │            │  200ms       │ │  10ms        │  │
//!                        │            └──────┬───────┘ └──────┬───────┘  │
//!                        └───────────────────┼────────────────┼──────────┘
//!                                            ▼                ▼
//!                                   upstream provider      SQLite
//! ```
//!
//! Each hop owns an independent deadline; failures are classified per hop and
//! collapsed into a bare 500 at the endpoint.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use quote_relay::config::{loader, PersistencePolicy};
use quote_relay::http::HttpServer;
use quote_relay::lifecycle::{self, signals, Shutdown};
use quote_relay::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "quote-relay")]
#[command(about = "Relays the current USD→BRL bid under per-hop deadlines", long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listener bind address.
    #[arg(long)]
    bind: Option<String>,

    /// Upstream fetch deadline in milliseconds.
    #[arg(long)]
    fetch_timeout_ms: Option<u64>,

    /// Persistence deadline in milliseconds.
    #[arg(long)]
    persist_timeout_ms: Option<u64>,

    /// Whole-request ceiling in milliseconds.
    #[arg(long)]
    handler_ceiling_ms: Option<u64>,

    /// SQLite database file.
    #[arg(long)]
    database: Option<String>,

    /// Fail requests whose quotation could not be persisted.
    #[arg(long)]
    strict_persistence: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = loader::read_or_default(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if let Some(ms) = args.fetch_timeout_ms {
        config.timeouts.fetch_ms = ms;
    }
    if let Some(ms) = args.persist_timeout_ms {
        config.timeouts.persist_ms = ms;
    }
    if let Some(ms) = args.handler_ceiling_ms {
        config.timeouts.handler_ceiling_ms = ms;
    }
    if let Some(path) = args.database {
        config.storage.database_path = path;
    }
    if args.strict_persistence {
        config.storage.persistence_policy = PersistencePolicy::Strict;
    }
    let config = loader::finalize(config)?;

    logging::init_tracing(&config.observability)?;
    tracing::info!("quote-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        fetch_ms = config.timeouts.fetch_ms,
        persist_ms = config.timeouts.persist_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let service = Arc::new(lifecycle::build_service(&config)?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(service, config.timeouts.handler_ceiling());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_on_signal(&shutdown).await;
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

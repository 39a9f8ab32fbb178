//! RemoteList Server Binary
//!
//! Recovers state from the data directory, then serves the TCP protocol
//! until interrupted.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use remotelist::network::Server;
use remotelist::{Compactor, Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// RemoteList Server
#[derive(Parser, Debug)]
#[command(name = "remotelist-server")]
#[command(about = "In-memory list store with an operation log and snapshots")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./remotelist_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:5000")]
    listen: String,

    /// Seconds between snapshot compactions
    #[arg(short = 'i', long, default_value = "30")]
    compaction_interval_secs: u64,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,remotelist=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("RemoteList Server v{}", remotelist::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .compaction_interval(Duration::from_secs(args.compaction_interval_secs))
        .max_connections(args.max_connections)
        .build();

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(2);
    }

    // Open engine; an unreadable snapshot must stop the process here
    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine initialized successfully");

    let compactor = match Compactor::start(Arc::clone(&engine), config.compaction_interval) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to start compactor: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::bind(config, Arc::clone(&engine)) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to bind: {}", e);
            std::process::exit(1);
        }
    };

    // Ctrl+C / SIGTERM stop the accept loop
    let shutdown = server.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received interrupt, initiating shutdown...");
        shutdown.shutdown();
    }) {
        tracing::warn!("Could not install signal handler: {}", e);
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    compactor.stop();
    drop(server);

    match Arc::try_unwrap(engine) {
        Ok(engine) => {
            if let Err(e) = engine.close() {
                tracing::warn!("Error closing engine: {}", e);
            }
        }
        Err(_) => tracing::info!("Clients still connected; log closes on exit"),
    }

    tracing::info!("Server stopped");
}

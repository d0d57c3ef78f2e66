//! txkv Server Binary
//!
//! Starts the TCP server for txkv.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use txkv::network::Server;
use txkv::{Config, KvService};

/// txkv Server
#[derive(Parser, Debug)]
#[command(name = "txkv-server")]
#[command(about = "Transactional key-value store with a write-ahead log")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./txkv_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7878")]
    listen: String,

    /// Maximum connections waiting for a worker
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Worker threads serving connections
    #[arg(short, long, default_value = "8")]
    workers: usize,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,txkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("txkv server v{}", txkv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .worker_threads(args.workers)
        .build();

    // Recovery runs here, before the listener is bound
    let service = match KvService::open(config.clone()) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::bind(config, service) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", args.listen, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

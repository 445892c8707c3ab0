//! LineKV Server Binary
//!
//! Starts the TCP server for LineKV.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;

use clap::Parser;
use linekv::config::{DEFAULT_MAX_HEADER_LEN, DEFAULT_MAX_VALUE_SIZE};
use linekv::network::Server;
use linekv::{Config, Store};
use tracing_subscriber::{fmt, EnvFilter};

/// LineKV Server
#[derive(Parser, Debug)]
#[command(name = "linekv-server")]
#[command(about = "Single-connection in-memory key-value server")]
#[command(version)]
struct Args {
    /// IPv4 address to bind (e.g. 0.0.0.0)
    bind_ip: Ipv4Addr,

    /// TCP port to listen on
    port: u16,

    /// Largest accepted value in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_VALUE_SIZE)]
    max_value_size: usize,

    /// Longest accepted header line in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_HEADER_LEN)]
    max_header_len: usize,

    /// Close idle connections after this many milliseconds (0 = never)
    #[arg(long, default_value_t = 0)]
    read_timeout_ms: u64,

    /// Drop clients that stop reading replies after this many milliseconds (0 = never)
    #[arg(long, default_value_t = 0)]
    write_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,linekv=debug"));

    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    tracing::info!("LineKV Server v{}", linekv::VERSION);

    let config = Config::builder()
        .listen_addr(SocketAddrV4::new(args.bind_ip, args.port))
        .max_value_size(args.max_value_size)
        .max_header_len(args.max_header_len)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .build();

    let store = Arc::new(Store::new());

    let server = match Server::bind(config, store) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
